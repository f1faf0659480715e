//! Virtual-to-real path mappers.
//!
//! A [`PathMapper`] turns a path name chosen by an untrusted or relocated
//! caller into the path name handed to the real file system. Mappers do no
//! I/O and can be used without wrapping a whole [`FileSystem`](crate::FileSystem).
//!
//! | Mapper | Absolute input | `..` escaping the base | Result |
//! |--------|----------------|------------------------|--------|
//! | [`ChdirPathMapper`] | placed under base | allowed | `clean(base/name)` |
//! | [`ContainedPathMapper`] | [`Error::NotExist`] | [`Error::NotExist`] | `clean(base/name)` |
//!
//! # Symbolic links
//!
//! Containment is lexical. A path that is lexically inside the base
//! directory can still reach outside of it through a symbolic link. Callers
//! that need a hard boundary must make sure the base directory contains no
//! links they do not control.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::base_dir::BaseDir;
use crate::error::{Error, Result};
use crate::paths;

/// Maps a virtual path name to its real path name.
pub trait PathMapper: Send + Sync {
    /// Return the real path for `virtual_path`, or an error.
    fn real_path(&self, virtual_path: &Path) -> Result<PathBuf>;
}

impl<M: PathMapper + ?Sized> PathMapper for Arc<M> {
    fn real_path(&self, virtual_path: &Path) -> Result<PathBuf> {
        (**self).real_path(virtual_path)
    }
}

impl<M: PathMapper + ?Sized> PathMapper for &M {
    fn real_path(&self, virtual_path: &Path) -> Result<PathBuf> {
        (**self).real_path(virtual_path)
    }
}

/// Adapter turning a closure into a [`PathMapper`].
///
/// ```rust
/// use fsx::{PathMapper, PathMapperFn};
/// use std::path::{Path, PathBuf};
///
/// let upper = PathMapperFn::new(|p: &Path| {
///     Ok(PathBuf::from(p.to_string_lossy().to_uppercase()))
/// });
/// assert_eq!(upper.real_path(Path::new("a/b"))?, PathBuf::from("A/B"));
/// # Ok::<(), fsx::Error>(())
/// ```
#[derive(Clone, Copy)]
pub struct PathMapperFn<F>(F);

impl<F> PathMapperFn<F>
where
    F: Fn(&Path) -> Result<PathBuf> + Send + Sync,
{
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> PathMapper for PathMapperFn<F>
where
    F: Fn(&Path) -> Result<PathBuf> + Send + Sync,
{
    fn real_path(&self, virtual_path: &Path) -> Result<PathBuf> {
        (self.0)(virtual_path)
    }
}

impl<F> std::fmt::Debug for PathMapperFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathMapperFn").finish_non_exhaustive()
    }
}

/// [`PathMapper`] that prepends a base directory to every path.
///
/// No containment: `..` may climb out of the base directory. Use
/// [`ContainedPathMapper`] when the caller is not trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChdirPathMapper {
    base: BaseDir,
}

impl ChdirPathMapper {
    /// Make `dir` absolute now and map relative to it.
    ///
    /// Use this when something may change the process's current directory
    /// while the mapper is in use.
    pub fn absolute(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_base_dir(BaseDir::absolute(dir)?))
    }

    /// Like [`ChdirPathMapper::absolute`], with a caller-supplied resolver.
    pub fn absolute_with<F>(dir: impl Into<PathBuf>, resolve: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> io::Result<PathBuf>,
    {
        Ok(Self::with_base_dir(BaseDir::absolute_with(dir, resolve)?))
    }

    /// Map relative to `dir` exactly as given.
    ///
    /// Cheaper and keeps Unix socket paths short, but follows any later
    /// change of the current directory.
    pub fn relative(dir: impl Into<PathBuf>) -> Self {
        Self::with_base_dir(BaseDir::relative(dir))
    }

    /// Map relative to an already constructed [`BaseDir`].
    pub fn with_base_dir(base: BaseDir) -> Self {
        Self { base }
    }

    /// The base directory.
    pub fn base_dir(&self) -> &BaseDir {
        &self.base
    }

    /// Infallible form of [`PathMapper::real_path`].
    pub fn join(&self, virtual_path: &Path) -> PathBuf {
        paths::join(self.base.as_path(), virtual_path)
    }
}

impl PathMapper for ChdirPathMapper {
    fn real_path(&self, virtual_path: &Path) -> Result<PathBuf> {
        Ok(self.join(virtual_path))
    }
}

/// [`PathMapper`] that refuses paths outside a base directory.
///
/// Absolute paths, and paths that after cleaning are not below the cleaned
/// base directory, fail with [`Error::NotExist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainedPathMapper {
    base: BaseDir,
    // cleaned form of `base`, computed once
    root: PathBuf,
}

impl ContainedPathMapper {
    /// Make `dir` absolute now and contain paths inside it.
    pub fn absolute(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_base_dir(BaseDir::absolute(dir)?))
    }

    /// Like [`ContainedPathMapper::absolute`], with a caller-supplied resolver.
    pub fn absolute_with<F>(dir: impl Into<PathBuf>, resolve: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> io::Result<PathBuf>,
    {
        Ok(Self::with_base_dir(BaseDir::absolute_with(dir, resolve)?))
    }

    /// Contain paths inside `dir` exactly as given.
    pub fn relative(dir: impl Into<PathBuf>) -> Self {
        Self::with_base_dir(BaseDir::relative(dir))
    }

    /// Contain paths inside an already constructed [`BaseDir`].
    pub fn with_base_dir(base: BaseDir) -> Self {
        let root = paths::clean(base.as_path());
        Self { base, root }
    }

    /// The base directory.
    pub fn base_dir(&self) -> &BaseDir {
        &self.base
    }
}

impl PathMapper for ContainedPathMapper {
    fn real_path(&self, virtual_path: &Path) -> Result<PathBuf> {
        // 1. entirely reject absolute path names
        if virtual_path.is_absolute() {
            return Err(Error::NotExist);
        }

        // 2. clean the path and make sure it is not outside the base path
        let full = paths::join(&self.root, virtual_path);
        if !paths::is_within(&full, &self.root) {
            return Err(Error::NotExist);
        }
        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chdir_relative_joins() {
        let m = ChdirPathMapper::relative("testdata");
        assert_eq!(
            m.real_path(Path::new("file.txt")).unwrap(),
            PathBuf::from("testdata/file.txt")
        );
    }

    #[test]
    fn chdir_allows_escapes() {
        let m = ChdirPathMapper::relative("/srv/data");
        assert_eq!(
            m.real_path(Path::new("../../etc/passwd")).unwrap(),
            PathBuf::from("/etc/passwd")
        );
        assert_eq!(
            m.real_path(Path::new("/etc/passwd")).unwrap(),
            PathBuf::from("/srv/data/etc/passwd")
        );
    }

    #[test]
    fn contained_rejects_absolute() {
        let m = ContainedPathMapper::relative("/srv/data");
        assert!(matches!(
            m.real_path(Path::new("/srv/data/x")),
            Err(Error::NotExist)
        ));
    }

    #[test]
    fn contained_rejects_escape() {
        let m = ContainedPathMapper::relative("/srv/data");
        assert!(matches!(
            m.real_path(Path::new("../../etc/passwd")),
            Err(Error::NotExist)
        ));
    }

    #[test]
    fn contained_rejects_sibling_with_common_prefix() {
        let m = ContainedPathMapper::relative("data");
        assert!(matches!(
            m.real_path(Path::new("../data2/x")),
            Err(Error::NotExist)
        ));
    }

    #[test]
    fn contained_accepts_inner_parent_components() {
        let m = ContainedPathMapper::relative("data");
        assert_eq!(
            m.real_path(Path::new("a/../b")).unwrap(),
            PathBuf::from("data/b")
        );
        assert_eq!(
            m.real_path(Path::new("../data/b")).unwrap(),
            PathBuf::from("data/b")
        );
        assert_eq!(m.real_path(Path::new("")).unwrap(), PathBuf::from("data"));
    }

    #[test]
    fn contained_cleans_base() {
        let m = ContainedPathMapper::relative("./data//sub/..");
        assert_eq!(
            m.real_path(Path::new("x")).unwrap(),
            PathBuf::from("data/x")
        );
        assert_eq!(m.base_dir().as_path(), Path::new("./data//sub/.."));
    }

    #[test]
    fn contained_dot_base() {
        let m = ContainedPathMapper::relative(".");
        assert_eq!(m.real_path(Path::new("x")).unwrap(), PathBuf::from("x"));
        assert!(m.real_path(Path::new("../x")).is_err());
    }

    #[test]
    fn mapper_fn_forwards() {
        let m = PathMapperFn::new(|p: &Path| Ok(Path::new("/x").join(p)));
        assert_eq!(m.real_path(Path::new("y")).unwrap(), PathBuf::from("/x/y"));
    }

    #[test]
    fn mapper_fn_forwards_errors() {
        let m = PathMapperFn::new(|_: &Path| Err(Error::NotExist));
        assert!(m.real_path(Path::new("y")).unwrap_err().is_not_exist());
    }

    #[test]
    fn mappers_work_as_trait_objects() {
        let mappers: Vec<Arc<dyn PathMapper>> = vec![
            Arc::new(ChdirPathMapper::relative("base")),
            Arc::new(ContainedPathMapper::relative("base")),
        ];
        for m in &mappers {
            assert_eq!(m.real_path(Path::new("f")).unwrap(), PathBuf::from("base/f"));
        }
    }
}
