// src/watch/event.rs

//! Change events as the watch controller sees them.

use std::path::PathBuf;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

use crate::fs::FileSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Modify,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Create)
    }

    pub fn modify(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Modify)
    }

    pub fn delete(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ChangeKind::Delete)
    }
}

/// Translate one `notify` event into zero or more change events.
///
/// Access events carry no change and are dropped. Renames become a delete of
/// the source and a create of the destination; when the backend cannot tell
/// which side a path is on, the path is stat'ed.
pub fn from_notify(event: &Event, fs: &dyn FileSystem) -> Vec<ChangeEvent> {
    let by_existence = |path: &PathBuf| {
        if fs.exists(path) {
            ChangeEvent::create(path.clone())
        } else {
            ChangeEvent::delete(path.clone())
        }
    };

    match event.kind {
        EventKind::Access(_) => Vec::new(),
        EventKind::Create(_) => event.paths.iter().cloned().map(ChangeEvent::create).collect(),
        EventKind::Remove(_) => event.paths.iter().cloned().map(ChangeEvent::delete).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => event.paths.iter().cloned().map(ChangeEvent::delete).collect(),
            RenameMode::To => event.paths.iter().cloned().map(ChangeEvent::create).collect(),
            RenameMode::Both => {
                let mut out = Vec::with_capacity(event.paths.len());
                if let Some((from, rest)) = event.paths.split_first() {
                    out.push(ChangeEvent::delete(from.clone()));
                    out.extend(rest.iter().cloned().map(ChangeEvent::create));
                }
                out
            }
            RenameMode::Any | RenameMode::Other => event.paths.iter().map(by_existence).collect(),
        },
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => {
            event.paths.iter().cloned().map(ChangeEvent::modify).collect()
        }
    }
}
