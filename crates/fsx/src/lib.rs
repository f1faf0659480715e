//! fsx - Policy-constrained views of the host file system
//!
//! fsx lets tools perform file and Unix domain socket operations through a
//! single [`FileSystem`] capability while the backing store and the path
//! translation policy are chosen separately and can be swapped, stacked or
//! mocked.
//!
//! - [`OsFs`]: the host file system
//! - [`ChdirFs`]: joins every path to a base directory ("just relocate")
//! - [`ContainedFs`]: joins every path to a base directory and rejects
//!   absolute paths and `..` escapes ("relocate and sandbox")
//! - [`ChdirPathMapper`], [`ContainedPathMapper`]: the same policies as
//!   standalone [`PathMapper`]s, for code that needs path names rather than
//!   file system calls
//! - [`MockFs`], [`MockFile`]: recording test doubles
//!
//! # Example
//!
//! ```rust
//! use fsx::{ChdirFs, ContainedFs, FileSystem, OsFs};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let dir = tempfile::tempdir()?;
//! std::fs::create_dir_all(dir.path().join("jobs/42"))?;
//!
//! // Wrappers compose: contain a job inside its directory of a relocated tree.
//! let tree: Arc<dyn FileSystem> = ChdirFs::new(OsFs::shared(), dir.path()).into();
//! let job = ContainedFs::new(tree, "jobs/42");
//!
//! job.mkdir(Path::new("out"), 0o755)?;
//! assert!(dir.path().join("jobs/42/out").is_dir());
//!
//! let err = job.mkdir(Path::new("../41/out"), 0o755).unwrap_err();
//! assert!(err.is_not_exist());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Limitations
//!
//! Containment is lexical. Symbolic links inside a base directory are
//! followed by the backing file system and may lead outside of it.
//!
//! Unix domain socket paths are short (about 100 bytes). Absolute base
//! directories make every socket path longer.
//!
//! # Logging
//!
//! Build with the `logging` feature to emit `tracing` events for rejected
//! and forwarded paths.

#[cfg(not(unix))]
compile_error!("fsx requires a Unix platform");

#[macro_use]
mod logging;

mod base_dir;
mod error;
mod fs;
mod mapper;
pub mod mocks;
pub mod paths;

pub use base_dir::BaseDir;
pub use error::{Error, PathError, Result, is_not_exist};
pub use fs::{
    ChdirFs, ContainedFs, DirEntry, File, FileSystem, FileType, Metadata, OpenFlags, OsFs,
};
pub use mapper::{ChdirPathMapper, ContainedPathMapper, PathMapper, PathMapperFn};
pub use mocks::{MockCall, MockFile, MockFs};

// Forward the platform's open flags so callers need not depend on libc.
pub use libc::{O_APPEND, O_CREAT as O_CREATE, O_RDONLY, O_RDWR, O_TRUNC, O_WRONLY};
