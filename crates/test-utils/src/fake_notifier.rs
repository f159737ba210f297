use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use as_soon::errors::{AsSoonError, Result};
use as_soon::watch::{Notifier, SubscriptionId, WatchMode};

/// What the runtime asked the notifier to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Subscribe {
        sub: SubscriptionId,
        root: PathBuf,
        mode: WatchMode,
    },
    Unsubscribe(SubscriptionId),
}

/// Shared view of a [`FakeNotifier`], kept by the test after the notifier
/// itself moved into the runtime.
#[derive(Debug, Clone, Default)]
pub struct NotifierLog {
    calls: Arc<Mutex<Vec<NotifierCall>>>,
    failing_roots: Arc<Mutex<HashSet<PathBuf>>>,
}

impl NotifierLog {
    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Subscriptions that were created and not yet dropped.
    pub fn live(&self) -> Vec<(SubscriptionId, PathBuf)> {
        let mut live: Vec<(SubscriptionId, PathBuf)> = Vec::new();
        for call in self.calls() {
            match call {
                NotifierCall::Subscribe { sub, root, .. } => live.push((sub, root)),
                NotifierCall::Unsubscribe(sub) => live.retain(|(s, _)| *s != sub),
            }
        }
        live
    }

    /// Most recent live subscription rooted at `root`.
    pub fn live_on(&self, root: &Path) -> Option<SubscriptionId> {
        self.live()
            .into_iter()
            .rev()
            .find(|(_, r)| r == root)
            .map(|(sub, _)| sub)
    }

    /// Make subscriptions on `root` fail until cleared.
    pub fn fail_on(&self, root: impl Into<PathBuf>) {
        self.failing_roots.lock().unwrap().insert(root.into());
    }

    pub fn clear_failures(&self) {
        self.failing_roots.lock().unwrap().clear();
    }
}

/// Notifier that never touches the filesystem; the test posts
/// `WatchEvent::Changes` itself.
#[derive(Debug, Clone, Default)]
pub struct FakeNotifier {
    log: NotifierLog,
}

impl FakeNotifier {
    pub fn new() -> (Self, NotifierLog) {
        let log = NotifierLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl Notifier for FakeNotifier {
    fn subscribe(&mut self, sub: SubscriptionId, root: &Path, mode: WatchMode) -> Result<()> {
        if self.log.failing_roots.lock().unwrap().contains(root) {
            return Err(AsSoonError::Other(anyhow::anyhow!(
                "fake subscription failure on {:?}",
                root
            )));
        }
        self.log.calls.lock().unwrap().push(NotifierCall::Subscribe {
            sub,
            root: root.to_path_buf(),
            mode,
        });
        Ok(())
    }

    fn unsubscribe(&mut self, sub: SubscriptionId) {
        self.log
            .calls
            .lock()
            .unwrap()
            .push(NotifierCall::Unsubscribe(sub));
    }
}
