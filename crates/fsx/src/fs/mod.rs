//! File system capability and implementations
//!
//! Provides the [`FileSystem`] trait and implementations:
//! - `OsFs`: the host file system
//! - `ChdirFs`: prefixes every path with a base directory
//! - `ContainedFs`: prefixes every path and refuses to leave the base directory

mod chdir;
mod contained;
mod os;
mod traits;

pub use chdir::ChdirFs;
pub use contained::ContainedFs;
pub use os::OsFs;
pub use traits::{DirEntry, File, FileSystem, FileType, Metadata, OpenFlags};

// Every wrapper and double must stay usable as a `dyn FileSystem`.
const _: fn() = || {
    fn assert_fs<T: FileSystem + 'static>() {}
    assert_fs::<OsFs>();
    assert_fs::<ChdirFs>();
    assert_fs::<ContainedFs>();
    assert_fs::<crate::mocks::MockFs>();

    fn assert_file<T: File + 'static>() {}
    assert_file::<std::fs::File>();
    assert_file::<crate::mocks::MockFile>();
};
