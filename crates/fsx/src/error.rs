//! Error types for fsx
//!
//! This module provides error types for the file system layer with the following design goals:
//! - Containment failures are indistinguishable from missing files for callers
//!   that only test for "not found"
//! - Errors from the dependency file system are forwarded untouched
//! - The failed operation and the caller's own path name are always reported

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using fsx's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// fsx error types.
#[derive(Error, Debug)]
pub enum Error {
    /// The path does not exist.
    ///
    /// Containing path mappers return this for absolute paths and for paths
    /// that leave their base directory. The reason is never reported.
    #[error("file does not exist")]
    NotExist,

    /// An operation failed on a specific path.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A base directory could not be made absolute.
    ///
    /// Returned by the absolute-mode constructors; no mapper or wrapper is
    /// produced when this happens.
    #[error("cannot resolve base directory {}: {source}", dir.display())]
    BaseDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error from the dependency file system.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Reports whether the error means "no such file".
    ///
    /// True for [`Error::NotExist`], for a [`PathError`] wrapping such an
    /// error, and for I/O errors of kind [`io::ErrorKind::NotFound`].
    pub fn is_not_exist(&self) -> bool {
        match self {
            Error::NotExist => true,
            Error::Path(err) => err.source.is_not_exist(),
            Error::Io(err) => err.kind() == io::ErrorKind::NotFound,
            Error::BaseDir { .. } => false,
        }
    }

    /// Build a [`PathError`] reporting that `path` does not exist for `op`.
    pub(crate) fn not_exist(op: &'static str, path: impl Into<PathBuf>) -> Self {
        PathError::new(op, path, Error::NotExist).into()
    }
}

/// Error recording the operation and the path that caused it.
///
/// `path` is the name the caller passed in, never the translated real path.
#[derive(Error, Debug)]
#[error("{op} {}: {source}", path.display())]
pub struct PathError {
    /// Operation name, e.g. `open` or `rename`.
    pub op: &'static str,
    /// Path as given by the caller.
    pub path: PathBuf,
    /// Underlying cause.
    #[source]
    pub source: Box<Error>,
}

impl PathError {
    /// Create a new path error.
    pub fn new(op: &'static str, path: impl Into<PathBuf>, source: Error) -> Self {
        Self {
            op,
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        if let Error::Io(err) = err {
            return err;
        }
        let kind = match &err {
            Error::BaseDir { source, .. } => source.kind(),
            err if err.is_not_exist() => io::ErrorKind::NotFound,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Reports whether `err` means "no such file".
///
/// Shorthand for [`Error::is_not_exist`].
pub fn is_not_exist(err: &Error) -> bool {
    err.is_not_exist()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_exist_is_not_exist() {
        assert!(Error::NotExist.is_not_exist());
        assert!(is_not_exist(&Error::NotExist));
    }

    #[test]
    fn path_error_wrapping_not_exist_is_not_exist() {
        let err = Error::not_exist("stat", "/etc/shadow");
        assert!(err.is_not_exist());
        assert_eq!(err.to_string(), "stat /etc/shadow: file does not exist");
    }

    #[test]
    fn io_not_found_is_not_exist() {
        let err = Error::from(io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_exist());
    }

    #[test]
    fn other_io_errors_are_not_not_exist() {
        let err = Error::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!err.is_not_exist());

        let wrapped: Error = PathError::new("open", "x", err).into();
        assert!(!wrapped.is_not_exist());
    }

    #[test]
    fn base_dir_error_is_not_not_exist() {
        let err = Error::BaseDir {
            dir: PathBuf::from("data"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!err.is_not_exist());
        assert!(err.to_string().starts_with("cannot resolve base directory data"));
    }

    #[test]
    fn path_error_exposes_source() {
        let err = Error::not_exist("rename", "../outside");
        let source = std::error::Error::source(&err).expect("path error has a source");
        assert_eq!(source.to_string(), "file does not exist");
    }

    #[test]
    fn into_io_error_maps_containment_to_not_found() {
        let err: io::Error = Error::not_exist("open", "/abs").into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(err.to_string(), "open /abs: file does not exist");
    }

    #[test]
    fn into_io_error_keeps_io_errors() {
        let err: io::Error = Error::Io(io::Error::from(io::ErrorKind::PermissionDenied)).into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn into_io_error_keeps_base_dir_kind() {
        let err: io::Error = Error::BaseDir {
            dir: PathBuf::from("gone"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
