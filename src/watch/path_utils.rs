// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Component, Path, PathBuf};

use crate::fs::FileSystem;

/// Make `raw` absolute against `cwd` and normalize it lexically.
///
/// - `.` components are dropped.
/// - `..` pops the previous component but never climbs above the root.
/// - Trailing separators disappear.
///
/// Symlinks are not resolved; the target may not exist yet.
pub fn normalize_path(raw: impl AsRef<Path>, cwd: &Path) -> PathBuf {
    let raw = raw.as_ref();
    let joined = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        cwd.join(raw)
    };
    normalize_lexically(&joined)
}

/// Lexical normalization of an already absolute path.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` on a bare root is a no-op.
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Whether an event path refers to `expected`.
///
/// Fast path is lexical equality. Otherwise the parents are canonicalized and
/// compared together with the file names; this helps on platforms (notably
/// macOS) where the notifier reports `/private/var/...` for `/var/...`.
/// Only parents are canonicalized because the entry itself may be gone.
pub fn paths_match(expected: &Path, actual: &Path, fs: &dyn FileSystem) -> bool {
    let actual = normalize_lexically(actual);
    if actual == expected {
        return true;
    }

    if expected.file_name() != actual.file_name() {
        return false;
    }

    match (expected.parent(), actual.parent()) {
        (Some(ep), Some(ap)) => match (fs.canonicalize(ep), fs.canonicalize(ap)) {
            (Ok(ep), Ok(ap)) => ep == ap,
            _ => false,
        },
        _ => false,
    }
}
