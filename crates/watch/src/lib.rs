//! Change notification for watched module sources
//!
//! A [`ChangeNotifier`] owns subscriptions from module names to source
//! locations and reports which names changed since the last drain. The
//! file-system implementation delivers events from the watcher thread over
//! a channel; draining happens on the container thread, so containers stay
//! single-threaded.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod fs;
pub mod manual;

pub use fs::FsNotifier;
pub use manual::ManualNotifier;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("cannot create file watcher")]
    Init(#[source] notify::Error),
    #[error("cannot watch {}", .path.display())]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// An active subscription, exclusively owned by one record.
#[derive(Debug)]
pub struct WatchHandle {
    id: u64,
}

impl WatchHandle {
    fn new(id: u64) -> Self {
        Self { id }
    }

    fn id(&self) -> u64 {
        self.id
    }
}

pub trait ChangeNotifier {
    /// Watch `location`, reporting changes under `name`. Fires for both
    /// modification and (re)creation of the location.
    fn subscribe(&mut self, name: &str, location: &Path) -> Result<WatchHandle, WatchError>;

    fn unsubscribe(&mut self, handle: WatchHandle);

    /// Names whose locations changed since the last drain.
    fn drain(&mut self) -> Vec<String>;
}

/// Notifier for containers with watching disabled: subscriptions succeed
/// and nothing is ever reported.
#[derive(Debug, Default)]
pub struct NullNotifier {
    next_id: u64,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChangeNotifier for NullNotifier {
    fn subscribe(&mut self, _name: &str, _location: &Path) -> Result<WatchHandle, WatchError> {
        self.next_id += 1;
        Ok(WatchHandle::new(self.next_id))
    }

    fn unsubscribe(&mut self, _handle: WatchHandle) {}

    fn drain(&mut self) -> Vec<String> {
        Vec::new()
    }
}
