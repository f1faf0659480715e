//! Lexical path arithmetic.
//!
//! Nothing here touches the file system except [`absolute`], which reads the
//! process's current directory. Symbolic links are never resolved, so a path
//! that is lexically inside a directory may still point outside of it.

use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Return the shortest lexically equivalent form of `path`.
///
/// - duplicate separators and `.` components are dropped
/// - `name/..` pairs are collapsed
/// - `..` directly under the root is dropped (`/..` is `/`)
/// - leading `..` components of a relative path are kept
/// - the empty result is `.`
pub fn clean(path: &Path) -> PathBuf {
    let mut rooted = false;
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) => {}
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(Component::ParentDir),
            },
            Component::Normal(_) => parts.push(component),
        }
    }

    let mut out = PathBuf::new();
    if rooted {
        out.push(Component::RootDir);
    }
    out.extend(parts);
    if out.as_os_str().is_empty() {
        out.push(Component::CurDir);
    }
    out
}

/// Place `name` under `base` and [`clean`] the result.
///
/// Unlike [`Path::join`], an absolute `name` does not replace `base`: its
/// components are appended like any other. `..` components are not checked
/// and can climb out of `base`.
pub fn join(base: &Path, name: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    joined.extend(
        name.components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_))),
    );
    clean(&joined)
}

/// Make `path` absolute against the current directory and [`clean`] it.
///
/// Fails only if the current directory cannot be determined.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(clean(path));
    }
    Ok(clean(&env::current_dir()?.join(path)))
}

/// Reports whether the cleaned `path` is `base` or lies below it.
///
/// Both arguments must already be [`clean`]. The comparison is per
/// component, so `data` does not contain `data2/x`, and nothing after the
/// base may climb back out (`..` does not contain `../..`).
pub fn is_within(path: &Path, base: &Path) -> bool {
    let rest = if base == Path::new(".") {
        path
    } else {
        match path.strip_prefix(base) {
            Ok(rest) => rest,
            Err(_) => return false,
        }
    };
    !rest.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
