//! Base directory configuration shared by mappers and wrappers.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;

/// Directory that virtual paths are joined against.
///
/// Fixed at construction and never mutated afterwards.
///
/// # Relative vs absolute
///
/// | Constructor | Stored path | Trade-off |
/// |-------------|-------------|-----------|
/// | [`BaseDir::relative`] | as given | follows later changes of the current directory; keeps Unix socket paths short |
/// | [`BaseDir::absolute`] | absolute, cleaned | immune to later changes of the current directory; may fail |
///
/// Unix domain socket paths are limited to roughly 100 bytes, so prefixing
/// a long absolute directory can push socket names over the limit.
///
/// # Example
///
/// ```rust
/// use fsx::BaseDir;
/// use std::path::Path;
///
/// let base = BaseDir::relative("testdata");
/// assert_eq!(base.as_path(), Path::new("testdata"));
///
/// let base = BaseDir::absolute("/srv/../srv/data")?;
/// assert_eq!(base.as_path(), Path::new("/srv/data"));
/// # Ok::<(), fsx::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDir {
    path: PathBuf,
}

impl BaseDir {
    /// Use `dir` exactly as given, relative or absolute.
    pub fn relative(dir: impl Into<PathBuf>) -> Self {
        Self { path: dir.into() }
    }

    /// Resolve `dir` against the current directory now.
    ///
    /// Fails with [`Error::BaseDir`] if the current directory cannot be
    /// determined.
    pub fn absolute(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::absolute_with(dir, paths::absolute)
    }

    /// Resolve `dir` with a caller-supplied resolver.
    ///
    /// The resolver receives `dir` and returns its absolute form. Its error
    /// becomes the source of [`Error::BaseDir`].
    pub fn absolute_with<F>(dir: impl Into<PathBuf>, resolve: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> io::Result<PathBuf>,
    {
        let dir = dir.into();
        match resolve(&dir) {
            Ok(path) => {
                log_debug!(dir = %dir.display(), resolved = %path.display(), "resolved base directory");
                Ok(Self { path })
            }
            Err(source) => Err(Error::BaseDir { dir, source }),
        }
    }

    /// The stored directory.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Whether the stored directory is absolute.
    pub fn is_absolute(&self) -> bool {
        self.path.is_absolute()
    }
}

impl AsRef<Path> for BaseDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl From<PathBuf> for BaseDir {
    fn from(path: PathBuf) -> Self {
        Self::relative(path)
    }
}

impl From<&Path> for BaseDir {
    fn from(path: &Path) -> Self {
        Self::relative(path)
    }
}

impl From<&str> for BaseDir {
    fn from(path: &str) -> Self {
        Self::relative(path)
    }
}
