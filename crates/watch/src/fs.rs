use std::path::{Path, PathBuf};

use ahash::AHashMap;
use crossbeam_channel::{Receiver, unbounded};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::{ChangeNotifier, WatchError, WatchHandle};

struct Subscription {
    name: String,
    path: PathBuf,
}

/// File-system notifier over one `notify` watcher.
///
/// The watcher callback runs on the watcher's thread and forwards
/// modify/create events through a channel; [`ChangeNotifier::drain`] maps
/// them back to subscribed names on the caller's thread.
pub struct FsNotifier {
    watcher: RecommendedWatcher,
    events: Receiver<PathBuf>,
    subscriptions: AHashMap<u64, Subscription>,
    next_id: u64,
}

impl FsNotifier {
    pub fn new() -> Result<Self, WatchError> {
        let (tx, rx) = unbounded();
        let watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            let Ok(event) = event else { return };
            if event.kind.is_modify() || event.kind.is_create() {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        })
        .map_err(WatchError::Init)?;

        Ok(Self {
            watcher,
            events: rx,
            subscriptions: AHashMap::new(),
            next_id: 0,
        })
    }
}

impl ChangeNotifier for FsNotifier {
    fn subscribe(&mut self, name: &str, location: &Path) -> Result<WatchHandle, WatchError> {
        // Canonicalize so delivered event paths compare equal to the
        // registered path.
        let path = location
            .canonicalize()
            .unwrap_or_else(|_| location.to_path_buf());
        self.watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Subscribe {
                path: path.clone(),
                source,
            })?;

        self.next_id += 1;
        self.subscriptions.insert(
            self.next_id,
            Subscription {
                name: name.into(),
                path,
            },
        );
        Ok(WatchHandle::new(self.next_id))
    }

    fn unsubscribe(&mut self, handle: WatchHandle) {
        let Some(removed) = self.subscriptions.remove(&handle.id()) else {
            return;
        };
        let still_watched = self
            .subscriptions
            .values()
            .any(|subscription| subscription.path == removed.path);
        if !still_watched {
            let _ = self.watcher.unwatch(&removed.path);
        }
    }

    fn drain(&mut self) -> Vec<String> {
        let mut changed = Vec::new();
        while let Ok(path) = self.events.try_recv() {
            for subscription in self.subscriptions.values() {
                if subscription.path == path {
                    changed.push(subscription.name.clone());
                }
            }
        }
        changed
    }
}
