use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ahash::AHashMap;

use crate::{ChangeNotifier, WatchError, WatchHandle};

#[derive(Default)]
struct ManualInner {
    subscriptions: AHashMap<u64, (String, PathBuf)>,
    pending: Vec<String>,
    next_id: u64,
}

/// An in-process notifier driven by explicit [`ManualNotifier::trigger`]
/// calls. Clones share state, so a test can keep one clone and hand the
/// other to a container.
#[derive(Clone, Default)]
pub struct ManualNotifier {
    inner: Rc<RefCell<ManualInner>>,
}

impl ManualNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emulate a change event for `name`. Returns false when nothing is
    /// subscribed under that name.
    pub fn trigger(&self, name: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let subscribed = inner
            .subscriptions
            .values()
            .any(|(subscribed, _)| subscribed == name);
        if subscribed {
            inner.pending.push(name.to_string());
        }
        subscribed
    }

    pub fn watched(&self, name: &str) -> bool {
        self.inner
            .borrow()
            .subscriptions
            .values()
            .any(|(subscribed, _)| subscribed == name)
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }
}

impl ChangeNotifier for ManualNotifier {
    fn subscribe(&mut self, name: &str, location: &Path) -> Result<WatchHandle, WatchError> {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .subscriptions
            .insert(id, (name.to_string(), location.to_path_buf()));
        Ok(WatchHandle::new(id))
    }

    fn unsubscribe(&mut self, handle: WatchHandle) {
        self.inner.borrow_mut().subscriptions.remove(&handle.id());
    }

    fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.inner.borrow_mut().pending)
    }
}
