//! fsx CLI - File operations confined to a base directory
//!
//! Usage:
//!   fsx --root /srv/data ls              # List the root directory
//!   fsx --root /srv/data cat a/b.txt     # Print a file
//!   echo hi | fsx put notes.txt          # Write stdin to a file
//!   fsx --json stat notes.txt            # Metadata as JSON
//!   fsx resolve ../etc/passwd            # Show the real path, or fail

mod commands;
mod logging;
mod sandbox;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use crate::sandbox::Sandbox;

/// fsx - File operations confined to a base directory
#[derive(Parser, Debug)]
#[command(name = "fsx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base directory every path is resolved against
    #[arg(long, env = "FSX_ROOT", default_value = ".", global = true)]
    root: PathBuf,

    /// Resolve the base directory to an absolute path at startup
    #[arg(long, env = "FSX_ABSOLUTE", global = true)]
    absolute: bool,

    /// Prefix paths with the base directory without confining them to it
    #[arg(long, global = true)]
    unconfined: bool,

    /// Print machine-readable JSON (ls, stat, lstat, resolve)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    /// List a directory
    Ls {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Show metadata, following symbolic links
    Stat { path: PathBuf },
    /// Show metadata without following symbolic links
    Lstat { path: PathBuf },
    /// Print files to stdout
    Cat {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Write stdin to a file
    Put {
        path: PathBuf,
        /// Append instead of truncating
        #[arg(long)]
        append: bool,
    },
    /// Create a directory
    Mkdir {
        /// Create missing parents, succeed if it exists
        #[arg(short = 'p', long)]
        parents: bool,
        /// Permission bits, in octal
        #[arg(long, default_value = "755", value_parser = parse_mode)]
        mode: u32,
        path: PathBuf,
    },
    /// Remove files or empty directories
    Rm {
        /// Remove directories and their contents
        #[arg(short = 'r', long)]
        recursive: bool,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Rename a file or directory
    Mv { from: PathBuf, to: PathBuf },
    /// Change permission bits
    Chmod {
        /// Permission bits, in octal
        #[arg(value_parser = parse_mode)]
        mode: u32,
        path: PathBuf,
    },
    /// Create a file or update its access and modification times
    Touch { path: PathBuf },
    /// Print the real path a virtual path maps to
    Resolve { path: PathBuf },
}

fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        Ok(_) => Err(format!("mode out of range: {s}")),
        Err(_) => Err(format!("invalid octal mode: {s}")),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::set_up_logging();

    let sandbox = Sandbox::open(&args.root, args.absolute, args.unconfined)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    commands::run(
        &args.command,
        &sandbox,
        args.json,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
}
