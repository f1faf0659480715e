//! File system capability definitions

use std::fmt;
use std::io::{Read, Write};
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::Path;
use std::time::SystemTime;

use crate::error::Result;

/// Platform open flags as accepted by [`FileSystem::open_file`].
pub type OpenFlags = libc::c_int;

/// File system capability.
///
/// Every backing file system, every wrapper and every test double implements
/// the full set of operations. Paths are interpreted by the implementation:
/// a wrapper translates them before forwarding to its dependency.
pub trait FileSystem: Send + Sync {
    /// Create or truncate a file for writing.
    fn create(&self, path: &Path) -> Result<Box<dyn File>>;

    /// Open a file for reading.
    fn open(&self, path: &Path) -> Result<Box<dyn File>>;

    /// Open a file with explicit flags (`O_RDONLY`, `O_CREATE`, ...) and
    /// permission bits used when the file is created.
    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> Result<Box<dyn File>>;

    /// Read directory entries, sorted by name.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Get file metadata, following symbolic links.
    fn stat(&self, path: &Path) -> Result<Metadata>;

    /// Get file metadata without following a final symbolic link.
    fn lstat(&self, path: &Path) -> Result<Metadata>;

    /// Change file permissions.
    fn chmod(&self, path: &Path, mode: u32) -> Result<()>;

    /// Change file owner and group.
    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()>;

    /// Change access and modification times.
    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()>;

    /// Remove a file or an empty directory.
    fn remove(&self, path: &Path) -> Result<()>;

    /// Remove a path and everything below it. Succeeds if the path does not exist.
    fn remove_all(&self, path: &Path) -> Result<()>;

    /// Rename/move a file or directory.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Create a directory.
    fn mkdir(&self, path: &Path, mode: u32) -> Result<()>;

    /// Create a directory and any missing parents.
    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()>;

    /// Connect to a Unix domain stream socket.
    fn dial_unix(&self, path: &Path) -> Result<UnixStream>;

    /// Bind and listen on a Unix domain stream socket.
    fn listen_unix(&self, path: &Path) -> Result<UnixListener>;
}

/// Open file capability.
///
/// Reading and writing come from [`Read`] and [`Write`]. Dropping a file
/// closes it silently; [`File::close`] closes it and reports the error.
pub trait File: Read + Write + Send + fmt::Debug {
    /// Close the file.
    fn close(self: Box<Self>) -> Result<()>;
}

/// File metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Metadata {
    /// File type
    pub file_type: FileType,
    /// File size in bytes
    pub size: u64,
    /// File permissions (Unix mode, permission and sticky/setid bits)
    pub mode: u32,
    /// Owner user id
    pub uid: u32,
    /// Owner group id
    pub gid: u32,
    /// Last modification time
    pub modified: SystemTime,
    /// Last access time
    pub accessed: SystemTime,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            file_type: FileType::File,
            size: 0,
            mode: 0o644,
            uid: 0,
            gid: 0,
            modified: SystemTime::UNIX_EPOCH,
            accessed: SystemTime::UNIX_EPOCH,
        }
    }
}

impl From<&std::fs::Metadata> for Metadata {
    fn from(meta: &std::fs::Metadata) -> Self {
        Self {
            file_type: meta.file_type().into(),
            size: meta.len(),
            mode: meta.mode() & 0o7777,
            uid: meta.uid(),
            gid: meta.gid(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            accessed: meta.accessed().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }
}

/// File type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FileType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link
    Symlink,
    /// Unix domain socket
    Socket,
    /// Anything else (devices, FIFOs)
    Other,
}

impl FileType {
    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    /// Check if this is a symlink.
    pub fn is_symlink(&self) -> bool {
        matches!(self, FileType::Symlink)
    }

    /// Check if this is a socket.
    pub fn is_socket(&self) -> bool {
        matches!(self, FileType::Socket)
    }
}

impl From<std::fs::FileType> for FileType {
    fn from(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            FileType::Symlink
        } else if ft.is_dir() {
            FileType::Directory
        } else if ft.is_file() {
            FileType::File
        } else if ft.is_socket() {
            FileType::Socket
        } else {
            FileType::Other
        }
    }
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DirEntry {
    /// Entry name (not full path)
    pub name: String,
    /// Entry metadata, not following symbolic links
    pub metadata: Metadata,
}
