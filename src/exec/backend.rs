// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The debounced executor talks to an `ExecutorBackend` instead of spawning
//! processes itself. This makes it easy to swap in a fake executor in tests.
//!
//! - `RealExecutorBackend` is the implementation used by `as-soon`. It starts
//!   each run on its own Tokio task and reports `WatchEvent::RunFinished`.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which runs were started and directly emits `RunFinished` events.

use std::future::Future;
use std::pin::Pin;

use crate::engine::EventSender;
use crate::errors::Result;

use super::ScheduledRun;
use super::runner::run_command;

/// Trait abstracting how a scheduled run is executed.
pub trait ExecutorBackend: Send {
    /// Start `run` in the background.
    ///
    /// Must not wait for the command to finish; completion is reported as a
    /// `WatchEvent::RunFinished` on the runtime channel.
    fn spawn_run(
        &mut self,
        run: ScheduledRun,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
pub struct RealExecutorBackend {
    tx: EventSender,
}

impl RealExecutorBackend {
    pub fn new(runtime_tx: EventSender) -> Self {
        Self { tx: runtime_tx }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_run(
        &mut self,
        run: ScheduledRun,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            tokio::spawn(run_command(run, tx));
            Ok(())
        })
    }
}
