// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::errors::Result;
use crate::exec::{DebouncedExecutor, ExecutorBackend};
use crate::fs::FileSystem;
use crate::watch::controller::{ControllerCommand, ControllerInput, TargetId, WatchController};
use crate::watch::notifier::Notifier;
use crate::watch::target::WatchTarget;

use super::{EventReceiver, EventSender, RuntimeOptions, WatchEvent};

/// Drives one [`WatchController`] per target in response to `WatchEvent`s
/// and delegates runs to a [`DebouncedExecutor`].
///
/// All semantics live in the controllers and the executor; this struct only
/// moves events in and executes the commands that come out.
pub struct Runtime<N: Notifier, E: ExecutorBackend> {
    controllers: Vec<WatchController>,
    fs: Arc<dyn FileSystem>,
    notifier: N,
    executor: DebouncedExecutor<E>,
    event_tx: EventSender,
    event_rx: EventReceiver,
    options: RuntimeOptions,
}

impl<N: Notifier, E: ExecutorBackend> fmt::Debug for Runtime<N, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("controllers", &self.controllers)
            .field("executor", &self.executor)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<N: Notifier, E: ExecutorBackend> Runtime<N, E> {
    pub fn new(
        targets: Vec<WatchTarget>,
        fs: Arc<dyn FileSystem>,
        notifier: N,
        executor: DebouncedExecutor<E>,
        (event_tx, event_rx): (EventSender, EventReceiver),
        options: RuntimeOptions,
    ) -> Self {
        let controllers = targets
            .into_iter()
            .enumerate()
            .map(|(id, target)| WatchController::new(id, target))
            .collect();

        Self {
            controllers,
            fs,
            notifier,
            executor,
            event_tx,
            event_rx,
            options,
        }
    }

    /// Main event loop.
    ///
    /// - Starts every controller; an unwatchable target aborts before anything
    ///   runs.
    /// - Runs the command once.
    /// - Consumes `WatchEvent`s and fires the debounced executor when its
    ///   deadline passes, until shutdown.
    pub async fn run(mut self) -> Result<()> {
        info!(
            targets = self.controllers.len(),
            debounce_ms = self.executor.quiet().as_millis() as u64,
            settle_ms = self.options.settle.as_millis() as u64,
            "as-soon runtime started"
        );

        self.start()?;
        self.executor.run_now().await;

        loop {
            let deadline = self.executor.deadline();

            tokio::select! {
                event = self.event_rx.recv() => {
                    let Some(event) = event else {
                        info!("runtime event channel closed; exiting");
                        break;
                    };
                    debug!(?event, "runtime received event");
                    if !self.handle_event(event).await {
                        break;
                    }
                }
                _ = sleep_until(deadline) => {
                    self.executor.fire().await;
                }
            }
        }

        self.shutdown();
        info!("runtime exiting");
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        for id in 0..self.controllers.len() {
            let commands = self.controllers[id].start(self.fs.as_ref())?;
            self.apply(id, commands, true)?;
        }
        Ok(())
    }

    /// Returns `false` when the loop should stop.
    async fn handle_event(&mut self, event: WatchEvent) -> bool {
        match event {
            WatchEvent::Changes { sub, events } => {
                self.feed(sub.target, ControllerInput::Changes { sub, events });
            }
            WatchEvent::WatchError { sub, message } => {
                warn!(%sub, error = %message, "file watch error");
            }
            WatchEvent::SettleElapsed { target, epoch } => {
                self.feed(target, ControllerInput::SettleElapsed { epoch });
            }
            WatchEvent::RunFinished { run, outcome } => {
                self.executor.finished(run, outcome).await;
            }
            WatchEvent::ShutdownRequested => {
                info!("shutdown requested");
                return false;
            }
        }
        true
    }

    fn feed(&mut self, target: TargetId, input: ControllerInput) {
        let Some(controller) = self.controllers.get_mut(target) else {
            warn!(target_id = target, "event for unknown watch target");
            return;
        };
        let commands = controller.step(input, self.fs.as_ref());
        if let Err(err) = self.apply(target, commands, false) {
            error!(target_id = target, error = %err, "failed to apply watch commands");
        }
    }

    /// Execute controller commands in order. Commands produced while doing so
    /// (subscription confirmations) are appended to the same queue.
    ///
    /// With `fatal` set, a subscription that cannot be established is an error
    /// instead of a retry.
    fn apply(&mut self, target: TargetId, commands: Vec<ControllerCommand>, fatal: bool) -> Result<()> {
        let mut queue: VecDeque<ControllerCommand> = commands.into();

        while let Some(command) = queue.pop_front() {
            match command {
                ControllerCommand::Subscribe { sub, root, mode } => {
                    let input = match self.notifier.subscribe(sub, &root, mode) {
                        Ok(()) => ControllerInput::Subscribed { sub },
                        Err(err) if fatal => return Err(err),
                        Err(err) => {
                            warn!(%sub, root = ?root, error = %err, "subscription failed");
                            ControllerInput::SubscribeFailed { sub }
                        }
                    };
                    let more = self.controllers[target].step(input, self.fs.as_ref());
                    queue.extend(more);
                }
                ControllerCommand::Unsubscribe(sub) => {
                    self.notifier.unsubscribe(sub);
                }
                ControllerCommand::Trigger => {
                    info!("files changed under {}", self.controllers[target].target().display);
                    self.executor.trigger();
                }
                ControllerCommand::Settle { epoch } => {
                    let tx = self.event_tx.clone();
                    let delay = self.options.settle;
                    debug!(target_id = target, epoch, ?delay, "settle timer started");
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(WatchEvent::SettleElapsed { target, epoch });
                    });
                }
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.executor.cancel_pending();
        for controller in &mut self.controllers {
            for command in controller.stop() {
                if let ControllerCommand::Unsubscribe(sub) = command {
                    self.notifier.unsubscribe(sub);
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
