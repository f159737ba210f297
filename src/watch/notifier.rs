// src/watch/notifier.rs

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info};

use crate::engine::{EventSender, WatchEvent};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::controller::{SubscriptionId, WatchMode};
use crate::watch::event::from_notify;

/// The filesystem notification layer as the runtime sees it.
///
/// Implementations deliver change batches for `sub` as
/// [`WatchEvent::Changes`] on the runtime channel until `unsubscribe(sub)`.
pub trait Notifier: Send {
    fn subscribe(&mut self, sub: SubscriptionId, root: &Path, mode: WatchMode) -> Result<()>;
    fn unsubscribe(&mut self, sub: SubscriptionId);
}

/// [`Notifier`] backed by `notify`, one watcher per subscription.
///
/// Dropping a watcher stops its callbacks, so unsubscribing is just removing
/// it from the map. Callbacks already queued on the channel are filtered out
/// by the controller's subscription-id check.
pub struct NotifyNotifier {
    tx: EventSender,
    fs: Arc<dyn FileSystem>,
    watchers: HashMap<SubscriptionId, RecommendedWatcher>,
}

impl std::fmt::Debug for NotifyNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyNotifier")
            .field("subscriptions", &self.watchers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NotifyNotifier {
    pub fn new(tx: EventSender, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            tx,
            fs,
            watchers: HashMap::new(),
        }
    }
}

impl Notifier for NotifyNotifier {
    fn subscribe(&mut self, sub: SubscriptionId, root: &Path, mode: WatchMode) -> Result<()> {
        let tx = self.tx.clone();
        let fs = Arc::clone(&self.fs);

        // Called synchronously by notify on its own thread.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let events = from_notify(&event, fs.as_ref());
                    if events.is_empty() {
                        return;
                    }
                    // Fails only once the runtime is gone.
                    let _ = tx.send(WatchEvent::Changes { sub, events });
                }
                Err(err) => {
                    let _ = tx.send(WatchEvent::WatchError {
                        sub,
                        message: err.to_string(),
                    });
                }
            },
            Config::default(),
        )?;

        let recursive = match mode {
            WatchMode::Recursive => RecursiveMode::Recursive,
            WatchMode::NonRecursive => RecursiveMode::NonRecursive,
        };
        watcher.watch(root, recursive)?;

        info!(%sub, %mode, "watching {:?}", root);
        self.watchers.insert(sub, watcher);
        Ok(())
    }

    fn unsubscribe(&mut self, sub: SubscriptionId) {
        if self.watchers.remove(&sub).is_some() {
            debug!(%sub, "subscription dropped");
        }
    }
}
