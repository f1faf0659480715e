//! Test doubles for [`FileSystem`] and [`File`].
//!
//! [`MockFs`] answers each operation with a closure registered through a
//! builder method and records every call it receives, configured or not.
//! Unconfigured operations fail with [`io::ErrorKind::Unsupported`].
//!
//! ```rust
//! use fsx::{FileSystem, MockFs};
//! use std::path::{Path, PathBuf};
//!
//! let fs = MockFs::new().on_rename(|_, _| Ok(()));
//! fs.rename(Path::new("old.txt"), Path::new("new.txt"))?;
//!
//! let calls = fs.calls();
//! assert_eq!(calls[0].op, "rename");
//! assert_eq!(calls[0].paths, vec![PathBuf::from("old.txt"), PathBuf::from("new.txt")]);
//! # Ok::<(), fsx::Error>(())
//! ```

use std::fmt;
use std::io::{self, Cursor, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use crate::error::Result;
use crate::fs::{DirEntry, File, FileSystem, Metadata, OpenFlags};

type PathFn<T> = Box<dyn Fn(&Path) -> Result<T> + Send + Sync>;
type PathModeFn = Box<dyn Fn(&Path, u32) -> Result<()> + Send + Sync>;
type OpenFileFn = Box<dyn Fn(&Path, OpenFlags, u32) -> Result<Box<dyn File>> + Send + Sync>;
type ChownFn = Box<dyn Fn(&Path, u32, u32) -> Result<()> + Send + Sync>;
type ChtimesFn = Box<dyn Fn(&Path, SystemTime, SystemTime) -> Result<()> + Send + Sync>;
type RenameFn = Box<dyn Fn(&Path, &Path) -> Result<()> + Send + Sync>;

/// One call received by a [`MockFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    /// Operation name, e.g. `stat` or `rename`.
    pub op: &'static str,
    /// Path arguments in call order.
    pub paths: Vec<PathBuf>,
}

/// Closure-driven [`FileSystem`] double.
#[derive(Default)]
pub struct MockFs {
    create: Option<PathFn<Box<dyn File>>>,
    open: Option<PathFn<Box<dyn File>>>,
    open_file: Option<OpenFileFn>,
    read_dir: Option<PathFn<Vec<DirEntry>>>,
    stat: Option<PathFn<Metadata>>,
    lstat: Option<PathFn<Metadata>>,
    chmod: Option<PathModeFn>,
    chown: Option<ChownFn>,
    chtimes: Option<ChtimesFn>,
    remove: Option<PathFn<()>>,
    remove_all: Option<PathFn<()>>,
    rename: Option<RenameFn>,
    mkdir: Option<PathModeFn>,
    mkdir_all: Option<PathModeFn>,
    dial_unix: Option<PathFn<UnixStream>>,
    listen_unix: Option<PathFn<UnixListener>>,
    calls: Mutex<Vec<MockCall>>,
}

fn unconfigured<T>(op: &'static str) -> Result<T> {
    Err(io::Error::new(io::ErrorKind::Unsupported, format!("mock: {op} not configured")).into())
}

impl MockFs {
    /// Create a mock with no operation configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer [`FileSystem::create`] with `f`.
    pub fn on_create(
        mut self,
        f: impl Fn(&Path) -> Result<Box<dyn File>> + Send + Sync + 'static,
    ) -> Self {
        self.create = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::open`] with `f`.
    pub fn on_open(
        mut self,
        f: impl Fn(&Path) -> Result<Box<dyn File>> + Send + Sync + 'static,
    ) -> Self {
        self.open = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::open_file`] with `f`.
    pub fn on_open_file(
        mut self,
        f: impl Fn(&Path, OpenFlags, u32) -> Result<Box<dyn File>> + Send + Sync + 'static,
    ) -> Self {
        self.open_file = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::read_dir`] with `f`.
    pub fn on_read_dir(
        mut self,
        f: impl Fn(&Path) -> Result<Vec<DirEntry>> + Send + Sync + 'static,
    ) -> Self {
        self.read_dir = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::stat`] with `f`.
    pub fn on_stat(mut self, f: impl Fn(&Path) -> Result<Metadata> + Send + Sync + 'static) -> Self {
        self.stat = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::lstat`] with `f`.
    pub fn on_lstat(mut self, f: impl Fn(&Path) -> Result<Metadata> + Send + Sync + 'static) -> Self {
        self.lstat = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::chmod`] with `f`.
    pub fn on_chmod(mut self, f: impl Fn(&Path, u32) -> Result<()> + Send + Sync + 'static) -> Self {
        self.chmod = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::chown`] with `f`.
    pub fn on_chown(
        mut self,
        f: impl Fn(&Path, u32, u32) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.chown = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::chtimes`] with `f`.
    pub fn on_chtimes(
        mut self,
        f: impl Fn(&Path, SystemTime, SystemTime) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.chtimes = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::remove`] with `f`.
    pub fn on_remove(mut self, f: impl Fn(&Path) -> Result<()> + Send + Sync + 'static) -> Self {
        self.remove = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::remove_all`] with `f`.
    pub fn on_remove_all(mut self, f: impl Fn(&Path) -> Result<()> + Send + Sync + 'static) -> Self {
        self.remove_all = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::rename`] with `f`.
    pub fn on_rename(
        mut self,
        f: impl Fn(&Path, &Path) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.rename = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::mkdir`] with `f`.
    pub fn on_mkdir(mut self, f: impl Fn(&Path, u32) -> Result<()> + Send + Sync + 'static) -> Self {
        self.mkdir = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::mkdir_all`] with `f`.
    pub fn on_mkdir_all(
        mut self,
        f: impl Fn(&Path, u32) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.mkdir_all = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::dial_unix`] with `f`.
    pub fn on_dial_unix(
        mut self,
        f: impl Fn(&Path) -> Result<UnixStream> + Send + Sync + 'static,
    ) -> Self {
        self.dial_unix = Some(Box::new(f));
        self
    }

    /// Answer [`FileSystem::listen_unix`] with `f`.
    pub fn on_listen_unix(
        mut self,
        f: impl Fn(&Path) -> Result<UnixListener> + Send + Sync + 'static,
    ) -> Self {
        self.listen_unix = Some(Box::new(f));
        self
    }

    /// All calls received so far, oldest first.
    pub fn calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.log().len()
    }

    /// Number of calls received for `op`.
    pub fn calls_to(&self, op: &str) -> usize {
        self.log().iter().filter(|call| call.op == op).count()
    }

    /// Forget all recorded calls.
    pub fn reset(&self) {
        self.log().clear();
    }

    // a panicking test closure must not hide the calls recorded before it
    fn log(&self) -> std::sync::MutexGuard<'_, Vec<MockCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, op: &'static str, paths: &[&Path]) {
        self.log().push(MockCall {
            op,
            paths: paths.iter().map(|p| p.to_path_buf()).collect(),
        });
    }
}

impl fmt::Debug for MockFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockFs")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl FileSystem for MockFs {
    fn create(&self, path: &Path) -> Result<Box<dyn File>> {
        self.record("create", &[path]);
        match &self.create {
            Some(f) => f(path),
            None => unconfigured("create"),
        }
    }

    fn open(&self, path: &Path) -> Result<Box<dyn File>> {
        self.record("open", &[path]);
        match &self.open {
            Some(f) => f(path),
            None => unconfigured("open"),
        }
    }

    fn open_file(&self, path: &Path, flags: OpenFlags, mode: u32) -> Result<Box<dyn File>> {
        self.record("openfile", &[path]);
        match &self.open_file {
            Some(f) => f(path, flags, mode),
            None => unconfigured("openfile"),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        self.record("readdir", &[path]);
        match &self.read_dir {
            Some(f) => f(path),
            None => unconfigured("readdir"),
        }
    }

    fn stat(&self, path: &Path) -> Result<Metadata> {
        self.record("stat", &[path]);
        match &self.stat {
            Some(f) => f(path),
            None => unconfigured("stat"),
        }
    }

    fn lstat(&self, path: &Path) -> Result<Metadata> {
        self.record("lstat", &[path]);
        match &self.lstat {
            Some(f) => f(path),
            None => unconfigured("lstat"),
        }
    }

    fn chmod(&self, path: &Path, mode: u32) -> Result<()> {
        self.record("chmod", &[path]);
        match &self.chmod {
            Some(f) => f(path, mode),
            None => unconfigured("chmod"),
        }
    }

    fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.record("chown", &[path]);
        match &self.chown {
            Some(f) => f(path, uid, gid),
            None => unconfigured("chown"),
        }
    }

    fn chtimes(&self, path: &Path, atime: SystemTime, mtime: SystemTime) -> Result<()> {
        self.record("chtimes", &[path]);
        match &self.chtimes {
            Some(f) => f(path, atime, mtime),
            None => unconfigured("chtimes"),
        }
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.record("remove", &[path]);
        match &self.remove {
            Some(f) => f(path),
            None => unconfigured("remove"),
        }
    }

    fn remove_all(&self, path: &Path) -> Result<()> {
        self.record("removeall", &[path]);
        match &self.remove_all {
            Some(f) => f(path),
            None => unconfigured("removeall"),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.record("rename", &[from, to]);
        match &self.rename {
            Some(f) => f(from, to),
            None => unconfigured("rename"),
        }
    }

    fn mkdir(&self, path: &Path, mode: u32) -> Result<()> {
        self.record("mkdir", &[path]);
        match &self.mkdir {
            Some(f) => f(path, mode),
            None => unconfigured("mkdir"),
        }
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> Result<()> {
        self.record("mkdirall", &[path]);
        match &self.mkdir_all {
            Some(f) => f(path, mode),
            None => unconfigured("mkdirall"),
        }
    }

    fn dial_unix(&self, path: &Path) -> Result<UnixStream> {
        self.record("dialunix", &[path]);
        match &self.dial_unix {
            Some(f) => f(path),
            None => unconfigured("dialunix"),
        }
    }

    fn listen_unix(&self, path: &Path) -> Result<UnixListener> {
        self.record("listenunix", &[path]);
        match &self.listen_unix {
            Some(f) => f(path),
            None => unconfigured("listenunix"),
        }
    }
}

type ReadFn = Box<dyn FnMut(&mut [u8]) -> io::Result<usize> + Send>;
type WriteFn = Box<dyn FnMut(&[u8]) -> io::Result<usize> + Send>;
type CloseFn = Box<dyn FnOnce() -> Result<()> + Send>;

/// Closure-driven [`File`] double.
///
/// Unconfigured reads and writes fail with [`io::ErrorKind::Unsupported`];
/// an unconfigured close succeeds.
#[derive(Default)]
pub struct MockFile {
    read: Option<ReadFn>,
    write: Option<WriteFn>,
    close: Option<CloseFn>,
}

impl MockFile {
    /// Create a mock with nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose reads return `content` and then end of file.
    pub fn reading(content: impl Into<Vec<u8>>) -> Self {
        let mut cursor = Cursor::new(content.into());
        Self::new().on_read(move |buf| cursor.read(buf))
    }

    /// Serve reads with `f`.
    pub fn on_read(mut self, f: impl FnMut(&mut [u8]) -> io::Result<usize> + Send + 'static) -> Self {
        self.read = Some(Box::new(f));
        self
    }

    /// Accept writes with `f`.
    pub fn on_write(mut self, f: impl FnMut(&[u8]) -> io::Result<usize> + Send + 'static) -> Self {
        self.write = Some(Box::new(f));
        self
    }

    /// Run `f` when the file is closed.
    pub fn on_close(mut self, f: impl FnOnce() -> Result<()> + Send + 'static) -> Self {
        self.close = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for MockFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockFile").finish_non_exhaustive()
    }
}

impl Read for MockFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.read {
            Some(f) => f(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "mock: read not configured",
            )),
        }
    }
}

impl Write for MockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.write {
            Some(f) => f(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "mock: write not configured",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl File for MockFile {
    fn close(self: Box<Self>) -> Result<()> {
        match self.close {
            Some(f) => f(),
            None => Ok(()),
        }
    }
}
