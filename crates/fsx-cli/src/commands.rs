//! Subcommand execution.
//!
//! Commands read from `input` and write to `out` so they can run against
//! in-memory buffers in tests.

use anyhow::{Context, Result};
use fsx::{DirEntry, FileSystem, Metadata, O_APPEND, O_CREATE, O_TRUNC, O_WRONLY};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::Command;
use crate::sandbox::Sandbox;

#[derive(Serialize)]
struct Resolved<'a> {
    path: &'a Path,
    real_path: PathBuf,
}

#[derive(Serialize)]
struct Stat<'a> {
    path: &'a Path,
    #[serde(flatten)]
    metadata: Metadata,
}

/// Execute `command` against the sandbox.
pub fn run(
    command: &Command,
    sandbox: &Sandbox,
    json: bool,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<()> {
    let fs = sandbox.fs();
    match command {
        Command::Ls { path } => {
            let entries = fs
                .read_dir(path)
                .with_context(|| format!("cannot list {}", path.display()))?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &entries)?;
                writeln!(out)?;
            } else {
                for entry in &entries {
                    writeln!(out, "{}", format_entry(entry))?;
                }
            }
        }
        Command::Stat { path } => {
            let metadata = fs
                .stat(path)
                .with_context(|| format!("cannot stat {}", path.display()))?;
            print_metadata(out, path, metadata, json)?;
        }
        Command::Lstat { path } => {
            let metadata = fs
                .lstat(path)
                .with_context(|| format!("cannot lstat {}", path.display()))?;
            print_metadata(out, path, metadata, json)?;
        }
        Command::Cat { paths } => {
            for path in paths {
                let mut file = fs
                    .open(path)
                    .with_context(|| format!("cannot open {}", path.display()))?;
                io::copy(&mut file, out)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                file.close()?;
            }
        }
        Command::Put { path, append } => {
            let flags = if *append {
                O_WRONLY | O_CREATE | O_APPEND
            } else {
                O_WRONLY | O_CREATE | O_TRUNC
            };
            let mut file = fs
                .open_file(path, flags, 0o666)
                .with_context(|| format!("cannot open {}", path.display()))?;
            io::copy(input, &mut file)
                .with_context(|| format!("cannot write {}", path.display()))?;
            file.close()
                .with_context(|| format!("cannot close {}", path.display()))?;
        }
        Command::Mkdir {
            parents,
            mode,
            path,
        } => {
            let result = if *parents {
                fs.mkdir_all(path, *mode)
            } else {
                fs.mkdir(path, *mode)
            };
            result.with_context(|| format!("cannot create directory {}", path.display()))?;
        }
        Command::Rm { recursive, paths } => {
            for path in paths {
                let result = if *recursive {
                    fs.remove_all(path)
                } else {
                    fs.remove(path)
                };
                result.with_context(|| format!("cannot remove {}", path.display()))?;
            }
        }
        Command::Mv { from, to } => {
            fs.rename(from, to).with_context(|| {
                format!("cannot move {} to {}", from.display(), to.display())
            })?;
        }
        Command::Chmod { mode, path } => {
            fs.chmod(path, *mode)
                .with_context(|| format!("cannot chmod {}", path.display()))?;
        }
        Command::Touch { path } => {
            touch(fs, path).with_context(|| format!("cannot touch {}", path.display()))?;
        }
        Command::Resolve { path } => {
            let real_path = sandbox
                .resolve(path)
                .with_context(|| format!("cannot resolve {}", path.display()))?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &Resolved { path, real_path })?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", real_path.display())?;
            }
        }
    }
    Ok(())
}

/// Create `path` if missing, then set both of its times to now.
fn touch(fs: &dyn FileSystem, path: &Path) -> fsx::Result<()> {
    let file = fs.open_file(path, O_WRONLY | O_CREATE, 0o666)?;
    file.close()?;
    let now = SystemTime::now();
    fs.chtimes(path, now, now)
}

fn print_metadata(out: &mut dyn Write, path: &Path, metadata: Metadata, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, &Stat { path, metadata })?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "path: {}", path.display())?;
    writeln!(out, "type: {}", type_name(&metadata))?;
    writeln!(out, "size: {}", metadata.size)?;
    writeln!(out, "mode: {:04o}", metadata.mode)?;
    writeln!(out, "uid: {}", metadata.uid)?;
    writeln!(out, "gid: {}", metadata.gid)?;
    writeln!(out, "modified: {}", unix_seconds(metadata.modified))?;
    writeln!(out, "accessed: {}", unix_seconds(metadata.accessed))?;
    Ok(())
}

fn format_entry(entry: &DirEntry) -> String {
    let suffix = if entry.metadata.file_type.is_dir() { "/" } else { "" };
    format!(
        "{:04o} {:>10} {}{}",
        entry.metadata.mode, entry.metadata.size, entry.name, suffix
    )
}

fn type_name(metadata: &Metadata) -> &'static str {
    let ft = metadata.file_type;
    if ft.is_dir() {
        "directory"
    } else if ft.is_symlink() {
        "symlink"
    } else if ft.is_socket() {
        "socket"
    } else if ft.is_file() {
        "file"
    } else {
        "other"
    }
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}
