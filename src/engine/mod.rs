// src/engine/mod.rs

//! Orchestration engine for as-soon.
//!
//! The per-target semantics live in the pure
//! [`WatchController`](crate::watch::controller::WatchController); this module
//! holds the async shell that feeds it:
//! - notifier change batches
//! - settle timers
//! - command completions
//! - shutdown signals
//!
//! and executes the commands the controllers return.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::watch::controller::{SubscriptionId, TargetId};
use crate::watch::event::ChangeEvent;

/// Sequence number of a command execution, starting at 1.
pub type RunId = u64;

/// Outcome of one execution of the watched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// Non-zero exit; `-1` when the process was killed by a signal.
    Failed(i32),
    /// The process could not be started at all.
    SpawnFailed(String),
}

/// Events flowing into the runtime from notifiers, timers and executors.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// A batch of changes seen by subscription `sub`.
    Changes {
        sub: SubscriptionId,
        events: Vec<ChangeEvent>,
    },
    /// The notifier backing `sub` reported an error.
    WatchError {
        sub: SubscriptionId,
        message: String,
    },
    /// The settle timer for `target` started at `epoch` ran out.
    SettleElapsed { target: TargetId, epoch: u64 },
    /// A command execution finished.
    RunFinished { run: RunId, outcome: RunOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub type EventSender = mpsc::UnboundedSender<WatchEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<WatchEvent>;

/// Channel every producer (notifier callbacks, timers, executor) posts into.
///
/// Unbounded because notifier callbacks run synchronously on foreign threads
/// and must never block.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Default quiet period of the debounced executor.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Default delay between seeing a pending target appear and re-subscribing.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Runtime timing knobs.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    pub settle: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
        }
    }
}

pub mod runtime;

pub use runtime::Runtime;
