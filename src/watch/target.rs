// src/watch/target.rs

//! Watch target resolution: absolute, normalized path plus what currently
//! lives there.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::path_utils::normalize_path;

/// What a watch target currently refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File,
    Directory,
    /// Nothing exists at the path (yet).
    Pending,
}

impl TargetKind {
    pub fn classify(fs: &dyn FileSystem, path: &Path) -> Self {
        if fs.is_dir(path) {
            TargetKind::Directory
        } else if fs.exists(path) {
            TargetKind::File
        } else {
            TargetKind::Pending
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetKind::File => "file",
            TargetKind::Directory => "directory",
            TargetKind::Pending => "pending",
        };
        f.write_str(s)
    }
}

/// A user-specified path to monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    /// Normalized absolute path.
    pub path: PathBuf,
    /// The path as the user wrote it, for status lines.
    pub display: String,
    pub kind: TargetKind,
}

impl WatchTarget {
    /// Resolve `raw` against `cwd`. Never fails: a missing path is `Pending`.
    pub fn resolve(fs: &dyn FileSystem, raw: &str, cwd: &Path) -> Self {
        let path = normalize_path(raw, cwd);
        let kind = TargetKind::classify(fs, &path);
        Self {
            path,
            display: raw.to_string(),
            kind,
        }
    }

    /// Re-stat the target and update `kind`.
    pub fn reclassify(&mut self, fs: &dyn FileSystem) -> TargetKind {
        self.kind = TargetKind::classify(fs, &self.path);
        self.kind
    }

    /// Directory that has to exist for this target to be watchable while it
    /// is not a directory itself.
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }
}

/// Resolve every raw target, keeping CLI order and dropping duplicates.
pub fn resolve_targets(fs: &dyn FileSystem, raws: &[String], cwd: &Path) -> Vec<WatchTarget> {
    let mut targets: Vec<WatchTarget> = Vec::with_capacity(raws.len());
    for raw in raws {
        let target = WatchTarget::resolve(fs, raw, cwd);
        if targets.iter().any(|t| t.path == target.path) {
            debug!(path = ?target.path, raw = %raw, "duplicate watch target ignored");
            continue;
        }
        targets.push(target);
    }
    targets
}
