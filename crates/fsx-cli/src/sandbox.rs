//! File system view selected by the global flags.

use anyhow::{Context, Result};
use fsx::{
    BaseDir, ChdirFs, ChdirPathMapper, ContainedFs, ContainedPathMapper, FileSystem, OsFs,
    PathMapper,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Host file system seen through a base directory, plus the matching path
/// mapper for `resolve`.
pub struct Sandbox {
    fs: Arc<dyn FileSystem>,
    mapper: Box<dyn PathMapper>,
}

impl Sandbox {
    /// Build the view for `root`.
    ///
    /// `absolute` resolves `root` against the current directory now;
    /// `unconfined` prefixes paths without rejecting escapes.
    pub fn open(root: &Path, absolute: bool, unconfined: bool) -> Result<Self> {
        let base = if absolute {
            BaseDir::absolute(root)
                .with_context(|| format!("cannot resolve root {}", root.display()))?
        } else {
            BaseDir::relative(root)
        };
        tracing::debug!(root = %base.as_path().display(), unconfined, "opening sandbox");
        Ok(Self::over(OsFs::shared(), base, unconfined))
    }

    /// Build the view over an arbitrary file system.
    pub fn over(dep: Arc<dyn FileSystem>, base: BaseDir, unconfined: bool) -> Self {
        if unconfined {
            Self {
                fs: ChdirFs::with_base_dir(dep, base.clone()).into(),
                mapper: Box::new(ChdirPathMapper::with_base_dir(base)),
            }
        } else {
            Self {
                fs: ContainedFs::with_base_dir(dep, base.clone()).into(),
                mapper: Box::new(ContainedPathMapper::with_base_dir(base)),
            }
        }
    }

    /// The file system every command runs against.
    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// The real path `path` maps to.
    pub fn resolve(&self, path: &Path) -> fsx::Result<PathBuf> {
        self.mapper.real_path(path)
    }
}
