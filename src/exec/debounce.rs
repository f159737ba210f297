// src/exec/debounce.rs

//! Debounced execution of the watched command.
//!
//! Triggers only move a single deadline forward ([`Debouncer::rearm`]); the
//! runtime's select loop sleeps until that deadline and then calls
//! [`DebouncedExecutor::fire`]. However many triggers land inside one quiet
//! period, exactly one run starts when it elapses.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::engine::{RunId, RunOutcome};

use super::{CommandSpec, ExecutorBackend, ScheduledRun};

/// Single cancel-and-rearm timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Drop any pending deadline and arm a new one a quiet period from now.
    pub fn rearm(&mut self) -> Instant {
        let deadline = Instant::now() + self.quiet;
        self.deadline = Some(deadline);
        deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return `true` if the deadline has passed at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Snapshot of the executor's bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCommandState {
    /// A debounce deadline is pending.
    pub armed: bool,
    /// A run has been started and has not reported back yet.
    pub in_flight: bool,
    /// Another run will start as soon as the in-flight one finishes.
    pub rerun_queued: bool,
}

/// Wraps an [`ExecutorBackend`] so that bursts of triggers become one run
/// and runs never overlap.
pub struct DebouncedExecutor<E: ExecutorBackend> {
    timer: Debouncer,
    backend: E,
    command: Arc<CommandSpec>,
    in_flight: Option<RunId>,
    rerun_queued: bool,
    runs_started: RunId,
}

impl<E: ExecutorBackend> std::fmt::Debug for DebouncedExecutor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedExecutor")
            .field("timer", &self.timer)
            .field("command", &self.command)
            .field("in_flight", &self.in_flight)
            .field("rerun_queued", &self.rerun_queued)
            .field("runs_started", &self.runs_started)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> DebouncedExecutor<E> {
    pub fn new(command: CommandSpec, backend: E, quiet: Duration) -> Self {
        Self {
            timer: Debouncer::new(quiet),
            backend,
            command: Arc::new(command),
            in_flight: None,
            rerun_queued: false,
            runs_started: 0,
        }
    }

    /// Request a run after the quiet period. Re-arms if already pending.
    pub fn trigger(&mut self) {
        let deadline = self.timer.rearm();
        debug!(?deadline, "debounce timer armed");
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn quiet(&self) -> Duration {
        self.timer.quiet()
    }

    /// Forget a pending trigger (shutdown).
    pub fn cancel_pending(&mut self) {
        self.timer.cancel();
    }

    pub fn state(&self) -> PendingCommandState {
        PendingCommandState {
            armed: self.timer.is_armed(),
            in_flight: self.in_flight.is_some(),
            rerun_queued: self.rerun_queued,
        }
    }

    pub fn runs_started(&self) -> RunId {
        self.runs_started
    }

    /// Called when the deadline may have elapsed. Starts a run, or queues one
    /// behind the run that is still going.
    pub async fn fire(&mut self) {
        if !self.timer.take_due(Instant::now()) {
            return;
        }

        if let Some(run) = self.in_flight {
            if !self.rerun_queued {
                debug!(run, "command still running; queueing one more run");
            }
            self.rerun_queued = true;
            return;
        }

        self.dispatch().await;
    }

    /// Start a run right away, bypassing the debounce timer.
    pub async fn run_now(&mut self) {
        if self.in_flight.is_some() {
            self.rerun_queued = true;
            return;
        }
        self.dispatch().await;
    }

    /// Record the end of a run and start the queued one, if any.
    pub async fn finished(&mut self, run: RunId, outcome: RunOutcome) {
        if self.in_flight != Some(run) {
            debug!(run, "ignoring completion of unknown run");
            return;
        }
        self.in_flight = None;

        match &outcome {
            RunOutcome::Success => info!(run, "command finished successfully"),
            RunOutcome::Failed(code) => warn!(run, exit_code = code, "command failed"),
            RunOutcome::SpawnFailed(message) => {
                error!(run, error = %message, "command could not be started")
            }
        }

        if self.rerun_queued {
            self.rerun_queued = false;
            self.dispatch().await;
        }
    }

    async fn dispatch(&mut self) {
        self.runs_started += 1;
        let id = self.runs_started;
        info!(run = id, command = %self.command, "---- run #{id} ----");

        let run = ScheduledRun {
            id,
            command: Arc::clone(&self.command),
        };

        match self.backend.spawn_run(run).await {
            Ok(()) => self.in_flight = Some(id),
            Err(err) => {
                // Absorbed: the next trigger tries again.
                error!(run = id, error = %err, "failed to hand run to executor");
            }
        }
    }
}
