// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Resolving watch targets into normalized absolute paths ([`target`]).
//! - The per-target state machine that survives deletion and creation of the
//!   watched path ([`controller`]).
//! - Wiring up a cross-platform filesystem notifier (`notify`) and turning
//!   its events into [`event::ChangeEvent`]s ([`notifier`], [`event`]).
//!
//! It does **not** run commands; it only asks the executor for a run.

pub mod controller;
pub mod event;
pub mod notifier;
pub mod path_utils;
pub mod target;

pub use controller::{
    ControllerCommand, ControllerInput, SubscriptionId, TargetId, WatchController, WatchMode,
    WatchState,
};
pub use event::{ChangeEvent, ChangeKind};
pub use notifier::{Notifier, NotifyNotifier};
pub use target::{TargetKind, WatchTarget, resolve_targets};
