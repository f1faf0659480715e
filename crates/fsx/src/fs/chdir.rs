//! Prefixing file system wrapper.
//!
//! [`ChdirFs`] behaves as if the process had changed into a base directory:
//! every path is joined to the base before being forwarded. It does not
//! enforce containment. Use [`ContainedFs`](super::ContainedFs) for that.

use std::fmt;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::traits::{DirEntry, File, FileSystem, Metadata, OpenFlags};
use crate::base_dir::BaseDir;
use crate::error::Result;
use crate::mapper::ChdirPathMapper;

/// [`FileSystem`] where each path is prefixed with a base directory.
///
/// `..` components and absolute paths are not rejected: `../x` reaches the
/// base directory's parent, and `/x` is placed under the base. Errors all
/// come from the dependency.
///
/// # Example
///
/// ```rust
/// use fsx::{ChdirFs, FileSystem, MockFs, Metadata};
/// use std::path::{Path, PathBuf};
/// use std::sync::Arc;
///
/// let dep = Arc::new(MockFs::new().on_stat(|_| Ok(Metadata::default())));
/// let fs = ChdirFs::new(dep.clone(), "/srv/data");
///
/// fs.stat(Path::new("../shared/file"))?;
/// assert_eq!(dep.calls()[0].paths, vec![PathBuf::from("/srv/shared/file")]);
/// # Ok::<(), fsx::Error>(())
/// ```
pub struct ChdirFs {
    mapper: ChdirPathMapper,
    dep: Arc<dyn FileSystem>,
}

impl ChdirFs {
    /// Wrap `dep`, prefixing every path with `dir` as given.
    pub fn new(dep: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self::with_base_dir(dep, BaseDir::relative(dir))
    }

    /// Wrap `dep`, prefixing every path with `base`.
    pub fn with_base_dir(dep: Arc<dyn FileSystem>, base: BaseDir) -> Self {
        Self {
            mapper: ChdirPathMapper::with_base_dir(base),
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

    #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
    fn real_path(&self, op: &'static str, name: &Path) -> PathBuf {
        let path = self.mapper.join(name);
        log_trace!(op, path = %path.display(), "forwarding");
        path
    }
}

impl fmt::Debug for ChdirFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChdirFs")
            .field("base", self.mapper.base_dir())
            .finish_non_exhaustive()
    }
}

impl FileSystem for ChdirFs {
    fn create(&self, path: &Path) -> Result<Box<dyn File>> {
        self.dep.create(&self.real_path("create", path))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn File>> {
        self.dep.open(&self.real_path("open", path))
    }

    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> Result<Box<dyn File>> {
        self.dep
            .open_file(&self.real_path("openfile", path), flags, mode)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        self.dep.read_dir(&self.real_path("readdir", path))
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        self.dep.stat(&self.real_path("stat", path))
    }

    fn lstat(&self, path: &Path) -> Result<Metadata> {
        self.dep.lstat(&self.real_path("lstat", path))
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        self.dep.chmod(&self.real_path("chmod", path), mode)
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.dep.chown(&self.real_path("chown", path), uid, gid)
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        self.dep
            .chtimes(&self.real_path("chtimes", path), atime, mtime)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.dep.remove(&self.real_path("remove", path))
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        self.dep.remove_all(&self.real_path("removeall", path))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.dep
            .rename(&self.real_path("rename", from), &self.real_path("rename", to))
    }

    fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
        self.dep.mkdir(&self.real_path("mkdir", path), mode)
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
        self.dep.mkdir_all(&self.real_path("mkdir", path), mode)
    }

    fn dial_unix(&self, path: &Path) -> Result<UnixStream> {
        self.dep.dial_unix(&self.real_path("dialunix", path))
    }

    fn listen_unix(&self, path: &Path) -> Result<UnixListener> {
        self.dep.listen_unix(&self.real_path("listenunix", path))
    }
}

// Allow ChdirFs to be used where Arc<dyn FileSystem> is expected
impl From<ChdirFs> for Arc<dyn FileSystem> {
    fn from(fs: ChdirFs) -> Self {
        Arc::new(fs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockFs;

    #[test]
    fn forwards_joined_path() {
        let dep = Arc::new(MockFs::new().on_remove(|_| Ok(())));
        let fs = ChdirFs::new(dep.clone(), "base");
        fs.remove(Path::new("a/b")).unwrap();
        assert_eq!(dep.calls()[0].op, "remove");
        assert_eq!(dep.calls()[0].paths, vec![PathBuf::from("base/a/b")]);
    }

    #[test]
    fn debug_shows_base() {
        let fs = ChdirFs::new(Arc::new(MockFs::new()), "base");
        assert!(format!("{fs:?}").contains("base"));
    }
}
