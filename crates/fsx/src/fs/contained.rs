//! Containing file system wrapper.
//!
//! [`ContainedFs`] roots a dependency file system at a base directory and
//! refuses to reach outside of it.
//!
//! # Security
//!
//! | Input | Outcome |
//! |-------|---------|
//! | relative path inside the base | forwarded as `clean(base/path)` |
//! | absolute path | `PathError { op, path, NotExist }`, dependency not called |
//! | path whose `..` leaves the base | `PathError { op, path, NotExist }`, dependency not called |
//!
//! A rejected path reports "file does not exist", the same as a missing
//! file, so callers learn nothing about why access was refused.
//!
//! Symbolic links are not resolved. A link inside the base directory that
//! points outside of it is followed by the dependency. Deployments that
//! need a hard boundary must keep untrusted links out of the base directory.

use std::fmt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::traits::{DirEntry, File, FileSystem, Metadata, OpenFlags};
use crate::base_dir::BaseDir;
use crate::error::{Error, Result};
use crate::mapper::{ContainedPathMapper, PathMapper};

/// [`FileSystem`] restricted to a base directory.
///
/// Every path is resolved against the base before the dependency is called.
/// Resolution failures never reach the dependency; dependency errors are
/// returned unchanged.
///
/// # Example
///
/// ```rust
/// use fsx::{ContainedFs, FileSystem, MockFs};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let dep = Arc::new(MockFs::new());
/// let fs = ContainedFs::new(dep.clone(), "/sandbox");
///
/// let err = fs.stat(Path::new("/etc/shadow")).unwrap_err();
/// assert!(err.is_not_exist());
/// assert_eq!(err.to_string(), "stat /etc/shadow: file does not exist");
/// assert_eq!(dep.call_count(), 0);
/// ```
pub struct ContainedFs {
    mapper: ContainedPathMapper,
    dep: Arc<dyn FileSystem>,
}

impl ContainedFs {
    /// Wrap `dep`, containing every path inside `dir` as given.
    pub fn new(dep: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self::with_base_dir(dep, BaseDir::relative(dir))
    }

    /// Wrap `dep`, containing every path inside `base`.
    pub fn with_base_dir(dep: Arc<dyn FileSystem>, base: BaseDir) -> Self {
        Self {
            mapper: ContainedPathMapper::with_base_dir(base),
            dep,
        }
    }

    /// The base directory.
    pub fn base_dir(&self) -> &BaseDir {
        self.mapper.base_dir()
    }

    /// The dependency file system.
    pub fn dependency(&self) -> &Arc<dyn FileSystem> {
        &self.dep
    }

    /// Resolve `name` for `op`, or fail with a path error naming `name`.
    fn real_path(&self, op: &'static str, name: &Path) -> Result<PathBuf> {
        match self.mapper.real_path(name) {
            Ok(path) => {
                log_trace!(op, path = %path.display(), "forwarding");
                Ok(path)
            }
            Err(_) => {
                log_debug!(op, path = %name.display(), "rejected path outside base directory");
                Err(Error::not_exist(op, name))
            }
        }
    }
}

impl fmt::Debug for ContainedFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainedFs")
            .field("base", self.mapper.base_dir())
            .finish_non_exhaustive()
    }
}

impl FileSystem for ContainedFs {
    fn create(&self, path: &Path) -> Result<Box<dyn File>> {
        let path = self.real_path("create", path)?;
        self.dep.create(&path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn File>> {
        let path = self.real_path("open", path)?;
        self.dep.open(&path)
    }

    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> Result<Box<dyn File>> {
        let path = self.real_path("openfile", path)?;
        self.dep.open_file(&path, flags, mode)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.real_path("readdir", path)?;
        self.dep.read_dir(&path)
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        let path = self.real_path("stat", path)?;
        self.dep.stat(&path)
    }

    fn lstat(&self, path: &Path) -> Result<Metadata> {
        let path = self.real_path("lstat", path)?;
        self.dep.lstat(&path)
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        let path = self.real_path("chmod", path)?;
        self.dep.chmod(&path, mode)
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        let path = self.real_path("chown", path)?;
        self.dep.chown(&path, uid, gid)
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        let path = self.real_path("chtimes", path)?;
        self.dep.chtimes(&path, atime, mtime)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let path = self.real_path("remove", path)?;
        self.dep.remove(&path)
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        let path = self.real_path("removeall", path)?;
        self.dep.remove_all(&path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        // both names resolve before the dependency sees either
        let from = self.real_path("rename", from)?;
        let to = self.real_path("rename", to)?;
        self.dep.rename(&from, &to)
    }

    fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
        let path = self.real_path("mkdir", path)?;
        self.dep.mkdir(&path, mode)
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let path = self.real_path("mkdir", path)?;
        self.dep.mkdir_all(&path, mode)
    }

    fn dial_unix(&self, path: &Path) -> Result<UnixStream> {
        let path = self.real_path("dialunix", path)?;
        self.dep.dial_unix(&path)
    }

    fn listen_unix(&self, path: &Path) -> Result<UnixListener> {
        let path = self.real_path("listenunix", path)?;
        self.dep.listen_unix(&path)
    }
}

// Allow ContainedFs to be used where Arc<dyn FileSystem> is expected
impl From<ContainedFs> for Arc<dyn FileSystem> {
    fn from(fs: ContainedFs) -> Self {
        Arc::new(fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;
    use crate::mocks::MockFs;

    #[test]
    fn rejection_names_op_and_virtual_path() {
        let fs = ContainedFs::new(Arc::new(MockFs::new()), "/srv/data");
        let err = fs.remove_all(Path::new("../../etc")).unwrap_err();
        match err {
            Error::Path(PathError { op, path, source }) => {
                assert_eq!(op, "removeall");
                assert_eq!(path, PathBuf::from("../../etc"));
                assert!(matches!(*source, Error::NotExist));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn mkdir_all_reports_mkdir() {
        let fs = ContainedFs::new(Arc::new(MockFs::new()), "base");
        let err = fs.mkdir_all(Path::new("/a/b"), 0o755).unwrap_err();
        assert_eq!(err.to_string(), "mkdir /a/b: file does not exist");
    }

    #[test]
    fn debug_shows_base() {
        let fs = ContainedFs::new(Arc::new(MockFs::new()), "/sandbox");
        assert!(format!("{fs:?}").contains("/sandbox"));
    }
}
