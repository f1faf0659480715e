//! Host file system.
//!
//! [`OsFs`] forwards every operation to `std::fs` and `std::os::unix::net`
//! with the path unchanged. It applies no policy of its own: wrap it in a
//! [`ContainedFs`](super::ContainedFs) to restrict what callers can reach.

use filetime::FileTime;
use std::fs::{self, DirBuilder, OpenOptions};
use std::io;
use std::os::fd::IntoRawFd;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use super::traits::{DirEntry, File, FileSystem, Metadata, OpenFlags};
use crate::error::Result;

/// Host file system.
///
/// # Example
///
/// ```rust
/// use fsx::{ContainedFs, FileSystem, OsFs};
/// use std::io::Write;
/// use std::path::Path;
///
/// let dir = tempfile::tempdir()?;
/// let fs = ContainedFs::new(OsFs::shared(), dir.path());
///
/// let mut file = fs.create(Path::new("hello.txt"))?;
/// file.write_all(b"hello")?;
/// file.close()?;
///
/// assert_eq!(fs.stat(Path::new("hello.txt"))?.size, 5);
/// assert!(fs.stat(Path::new("../escape")).unwrap_err().is_not_exist());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl OsFs {
    /// Create a new host file system.
    pub fn new() -> Self {
        Self
    }

    /// Create a new host file system behind an `Arc`, ready to be wrapped.
    pub fn shared() -> Arc<dyn FileSystem> {
        Arc::new(Self)
    }
}

/// Translate platform open flags onto [`OpenOptions`].
///
/// Only the access mode goes through the builder. Create, truncate, append
/// and every other bit are handed to open(2) unchanged, so combinations such
/// as `O_RDONLY | O_CREAT` behave as the platform defines them.
fn open_options(flags: OpenFlags, mode: u32) -> OpenOptions {
    let mut options = OpenOptions::new();
    match flags & libc::O_ACCMODE {
        libc::O_WRONLY => options.write(true),
        libc::O_RDWR => options.read(true).write(true),
        _ => options.read(true),
    };
    options.mode(mode).custom_flags(flags & !libc::O_ACCMODE);
    options
}

impl FileSystem for OsFs {
    fn create(&self, path: &Path) -> Result<Box<dyn File>> {
        self.open_file(
            path,
            libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
            0o666,
        )
    }

    fn open(&self, path: &Path) -> Result<Box<dyn File>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> Result<Box<dyn File>> {
        let file = open_options(flags, mode).open(path)?;
        Ok(Box::new(file))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                metadata: Metadata::from(&metadata),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        Ok(Metadata::from(&fs::metadata(path)?))
    }

    fn lstat(&self, path: &Path) -> Result<Metadata> {
        Ok(Metadata::from(&fs::symlink_metadata(path)?))
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        std::os::unix::fs::chown(path, Some(uid), Some(gid))?;
        Ok(())
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        filetime::set_file_times(
            path,
            FileTime::from_system_time(atime),
            FileTime::from_system_time(mtime),
        )?;
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let file_err = match fs::remove_file(path) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        match fs::remove_dir(path) {
            Ok(()) => Ok(()),
            // not a directory: the unlink error is the meaningful one
            Err(err) if err.raw_os_error() == Some(libc::ENOTDIR) => Err(file_err.into()),
            Err(err) => Err(err.into()),
        }
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        if meta.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to)?;
        Ok(())
    }

    fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
        DirBuilder::new().mode(mode).create(path)?;
        Ok(())
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
        DirBuilder::new().recursive(true).mode(mode).create(path)?;
        Ok(())
    }

    fn dial_unix(&self, path: &Path) -> Result<UnixStream> {
        Ok(UnixStream::connect(path)?)
    }

    fn listen_unix(&self, path: &Path) -> Result<UnixListener> {
        Ok(UnixListener::bind(path)?)
    }
}

impl File for fs::File {
    fn close(self: Box<Self>) -> Result<()> {
        let fd = (*self).into_raw_fd();
        // SAFETY: `fd` was just released by `into_raw_fd` and is owned here.
        if unsafe { libc::close(fd) } == -1 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(())
    }
}
