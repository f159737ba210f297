use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use as_soon::engine::{EventSender, RunId, RunOutcome, WatchEvent};
use as_soon::errors::Result;
use as_soon::exec::{ExecutorBackend, ScheduledRun};

/// A fake executor that:
/// - records which runs were started
/// - immediately reports `RunFinished(Success)` for each, unless told to
///   hold completions back.
pub struct FakeExecutor {
    runtime_tx: EventSender,
    executed: Arc<Mutex<Vec<RunId>>>,
    auto_complete: bool,
}

impl FakeExecutor {
    pub fn new(runtime_tx: EventSender, executed: Arc<Mutex<Vec<RunId>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            auto_complete: true,
        }
    }

    /// Record runs but never report completion; the test sends
    /// `RunFinished` itself.
    pub fn holding(runtime_tx: EventSender, executed: Arc<Mutex<Vec<RunId>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            auto_complete: false,
        }
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_run(
        &mut self,
        run: ScheduledRun,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let auto_complete = self.auto_complete;

        Box::pin(async move {
            {
                let mut guard = executed.lock().unwrap();
                guard.push(run.id);
            }

            if auto_complete {
                tx.send(WatchEvent::RunFinished {
                    run: run.id,
                    outcome: RunOutcome::Success,
                })
                .map_err(|e| anyhow::anyhow!("runtime channel closed: {e}"))?;
            }
            Ok(())
        })
    }
}
