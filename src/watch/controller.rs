// src/watch/controller.rs

//! Per-target watch state machine.
//!
//! A [`WatchController`] keeps one logical watch alive for one
//! [`WatchTarget`] while the thing at that path comes and goes:
//!
//! ```text
//! Entry ──dir──────▶ WatchingDirectory ──delete(self)──▶ Entry
//!       ──file─────▶ WatchingFileViaParent ──delete(parent)──▶ Entry
//!       ──missing──▶ AwaitingCreate ──create(target)──▶ Settling ──elapsed──▶ Entry
//! ```
//!
//! The controller is synchronous and performs no IO apart from stat calls
//! through [`FileSystem`]. Every transition returns a list of
//! [`ControllerCommand`]s which the runtime executes (subscribe, unsubscribe,
//! trigger the executor, start the settle timer). Inputs tagged with a
//! subscription id or epoch that is no longer current are ignored, so late
//! callbacks from a replaced subscription cannot act on the new state.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::{AsSoonError, Result};
use crate::fs::FileSystem;
use crate::watch::event::{ChangeEvent, ChangeKind};
use crate::watch::path_utils::paths_match;
use crate::watch::target::{TargetKind, WatchTarget};

/// Index of a target in the runtime's controller list.
pub type TargetId = usize;

/// Identity of one subscription. `seq` grows with every subscription the
/// target's controller creates, so ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId {
    pub target: TargetId,
    pub seq: u64,
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target, self.seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Recursive,
    NonRecursive,
}

impl fmt::Display for WatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchMode::Recursive => f.write_str("recursive"),
            WatchMode::NonRecursive => f.write_str("non-recursive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    /// No subscription. Initial state, and the resting state of a target
    /// whose parent directory vanished at runtime.
    Unwatched,
    WatchingDirectory {
        sub: SubscriptionId,
    },
    /// File targets are watched through their parent directory; editors that
    /// replace-on-save would otherwise orphan a file-level watch.
    WatchingFileViaParent {
        sub: SubscriptionId,
        parent: PathBuf,
    },
    AwaitingCreate {
        sub: SubscriptionId,
        parent: PathBuf,
    },
    /// Waiting out the settling delay before re-entering.
    Settling {
        epoch: u64,
    },
}

impl WatchState {
    pub fn subscription(&self) -> Option<SubscriptionId> {
        match self {
            WatchState::WatchingDirectory { sub }
            | WatchState::WatchingFileViaParent { sub, .. }
            | WatchState::AwaitingCreate { sub, .. } => Some(*sub),
            WatchState::Unwatched | WatchState::Settling { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerInput {
    /// One batch of change events delivered by subscription `sub`.
    Changes {
        sub: SubscriptionId,
        events: Vec<ChangeEvent>,
    },
    /// The notifier established subscription `sub`.
    Subscribed { sub: SubscriptionId },
    /// The notifier could not establish subscription `sub`.
    SubscribeFailed { sub: SubscriptionId },
    /// The settle timer started for `epoch` ran out.
    SettleElapsed { epoch: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCommand {
    Subscribe {
        sub: SubscriptionId,
        root: PathBuf,
        mode: WatchMode,
    },
    Unsubscribe(SubscriptionId),
    /// Ask the debounced executor for a run.
    Trigger,
    /// Start the settle timer; report back with `SettleElapsed { epoch }`.
    Settle { epoch: u64 },
}

/// Whether an entry failure is fatal (startup) or absorbed (runtime).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryPhase {
    Startup,
    Restart,
}

#[derive(Debug)]
pub struct WatchController {
    id: TargetId,
    target: WatchTarget,
    state: WatchState,
    next_seq: u64,
    epoch: u64,
}

impl WatchController {
    pub fn new(id: TargetId, target: WatchTarget) -> Self {
        Self {
            id,
            target,
            state: WatchState::Unwatched,
            next_seq: 0,
            epoch: 0,
        }
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// First entry. Fails with [`AsSoonError::MissingParent`] when neither the
    /// target nor its parent directory exist.
    pub fn start(&mut self, fs: &dyn FileSystem) -> Result<Vec<ControllerCommand>> {
        let mut commands = self.release();
        commands.extend(self.enter(fs, EntryPhase::Startup)?);
        Ok(commands)
    }

    /// Give up the current subscription for good.
    pub fn stop(&mut self) -> Vec<ControllerCommand> {
        self.release()
    }

    /// Feed one input and get back the commands it produced.
    pub fn step(&mut self, input: ControllerInput, fs: &dyn FileSystem) -> Vec<ControllerCommand> {
        match input {
            ControllerInput::Changes { sub, events } => {
                if !self.is_current(sub) {
                    debug!(watch = %self.target.display, %sub, "ignoring events from stale subscription");
                    return Vec::new();
                }
                self.on_changes(&events, fs)
            }
            ControllerInput::Subscribed { sub } => {
                if !self.is_current(sub) {
                    return Vec::new();
                }
                self.on_subscribed(fs)
            }
            ControllerInput::SubscribeFailed { sub } => {
                if !self.is_current(sub) {
                    return Vec::new();
                }
                warn!(
                    watch = %self.target.display,
                    %sub,
                    "could not watch target; retrying after settling delay"
                );
                self.settle()
            }
            ControllerInput::SettleElapsed { epoch } => match self.state {
                WatchState::Settling { epoch: current } if current == epoch => self.restart(fs),
                _ => {
                    debug!(watch = %self.target.display, epoch, "ignoring stale settle timer");
                    Vec::new()
                }
            },
        }
    }

    fn is_current(&self, sub: SubscriptionId) -> bool {
        self.state.subscription() == Some(sub)
    }

    fn on_changes(&mut self, events: &[ChangeEvent], fs: &dyn FileSystem) -> Vec<ControllerCommand> {
        let target = self.target.path.clone();

        match self.state.clone() {
            WatchState::WatchingDirectory { .. } => {
                if events.iter().any(|e| is_delete_of(e, &target, fs)) {
                    info!(watch = %self.target.display, "watched directory was removed; re-resolving");
                    return self.restart(fs);
                }
                if events.is_empty() {
                    Vec::new()
                } else {
                    vec![ControllerCommand::Trigger]
                }
            }
            WatchState::WatchingFileViaParent { parent, .. } => {
                if events.iter().any(|e| is_delete_of(e, &parent, fs)) {
                    info!(
                        watch = %self.target.display,
                        parent = ?parent,
                        "parent directory of watched file was removed; re-resolving"
                    );
                    return self.restart(fs);
                }
                let touched = events.iter().any(|e| {
                    matches!(e.kind, ChangeKind::Create | ChangeKind::Modify)
                        && paths_match(&target, &e.path, fs)
                });
                if touched {
                    vec![ControllerCommand::Trigger]
                } else {
                    Vec::new()
                }
            }
            WatchState::AwaitingCreate { parent, .. } => {
                let created = events
                    .iter()
                    .any(|e| e.kind == ChangeKind::Create && paths_match(&target, &e.path, fs));
                if created {
                    info!(watch = %self.target.display, "watched path was created");
                    let mut commands = self.release();
                    commands.extend(self.settle());
                    return commands;
                }
                if events.iter().any(|e| is_delete_of(e, &parent, fs)) {
                    info!(
                        watch = %self.target.display,
                        parent = ?parent,
                        "parent directory of pending target was removed; re-resolving"
                    );
                    return self.restart(fs);
                }
                Vec::new()
            }
            WatchState::Unwatched | WatchState::Settling { .. } => Vec::new(),
        }
    }

    /// The target may have appeared between the stat in `enter` and the
    /// subscription becoming live; no create event would ever arrive for it.
    fn on_subscribed(&mut self, fs: &dyn FileSystem) -> Vec<ControllerCommand> {
        if !matches!(self.state, WatchState::AwaitingCreate { .. }) {
            return Vec::new();
        }
        if TargetKind::classify(fs, &self.target.path) == TargetKind::Pending {
            return Vec::new();
        }
        info!(watch = %self.target.display, "watched path appeared while subscribing");
        let mut commands = self.release();
        commands.extend(self.settle());
        commands
    }

    /// Drop the current subscription (if any) and enter again.
    fn restart(&mut self, fs: &dyn FileSystem) -> Vec<ControllerCommand> {
        let mut commands = self.release();
        match self.enter(fs, EntryPhase::Restart) {
            Ok(more) => commands.extend(more),
            Err(err) => {
                warn!(
                    watch = %self.target.display,
                    error = %err,
                    "target can no longer be watched"
                );
                self.state = WatchState::Unwatched;
            }
        }
        commands
    }

    fn release(&mut self) -> Vec<ControllerCommand> {
        let previous = std::mem::replace(&mut self.state, WatchState::Unwatched);
        previous
            .subscription()
            .map(ControllerCommand::Unsubscribe)
            .into_iter()
            .collect()
    }

    fn settle(&mut self) -> Vec<ControllerCommand> {
        self.epoch += 1;
        self.state = WatchState::Settling { epoch: self.epoch };
        vec![ControllerCommand::Settle { epoch: self.epoch }]
    }

    fn next_sub(&mut self) -> SubscriptionId {
        self.next_seq += 1;
        SubscriptionId {
            target: self.id,
            seq: self.next_seq,
        }
    }

    /// Entry: classify the target and subscribe accordingly. Expects the
    /// previous subscription to be released already.
    fn enter(&mut self, fs: &dyn FileSystem, phase: EntryPhase) -> Result<Vec<ControllerCommand>> {
        let kind = self.target.reclassify(fs);
        debug!(watch = %self.target.display, %kind, ?phase, "entering watch state");

        let (state, root, mode) = match kind {
            TargetKind::Directory => {
                let sub = self.next_sub();
                (
                    WatchState::WatchingDirectory { sub },
                    self.target.path.clone(),
                    WatchMode::Recursive,
                )
            }
            TargetKind::File => {
                let parent = self.existing_parent(fs)?;
                let sub = self.next_sub();
                (
                    WatchState::WatchingFileViaParent {
                        sub,
                        parent: parent.clone(),
                    },
                    parent,
                    WatchMode::NonRecursive,
                )
            }
            TargetKind::Pending => {
                let parent = self.existing_parent(fs)?;
                let sub = self.next_sub();
                (
                    WatchState::AwaitingCreate {
                        sub,
                        parent: parent.clone(),
                    },
                    parent,
                    WatchMode::NonRecursive,
                )
            }
        };

        let sub = state.subscription();
        self.state = state;
        Ok(sub
            .map(|sub| ControllerCommand::Subscribe { sub, root, mode })
            .into_iter()
            .collect())
    }

    fn existing_parent(&self, fs: &dyn FileSystem) -> Result<PathBuf> {
        let parent = self
            .target
            .parent()
            .unwrap_or(self.target.path.as_path())
            .to_path_buf();
        if fs.is_dir(&parent) {
            Ok(parent)
        } else {
            Err(AsSoonError::MissingParent {
                target: self.target.path.clone(),
                parent,
            })
        }
    }
}

fn is_delete_of(event: &ChangeEvent, path: &Path, fs: &dyn FileSystem) -> bool {
    event.kind == ChangeKind::Delete && paths_match(path, &event.path, fs)
}
