use std::path::PathBuf;
use std::rc::Rc;

use manifest::{Builder, Finalizer, Metadata, Value};
use watch::WatchHandle;

/// Lifecycle stage of one named module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum State {
    #[default]
    Absent,
    Located,
    Loaded,
    Initializing,
    Ready,
}

/// Per-name lifecycle record. Created on first request or registration,
/// mutated in place through state transitions and kept for the container's
/// lifetime.
#[derive(Default)]
pub(crate) struct Record {
    pub state: State,
    pub errored: bool,
    pub location: Option<PathBuf>,
    pub watch: Option<WatchHandle>,
    pub deps: Option<Vec<String>>,
    pub init: Option<Rc<Builder>>,
    pub finalizer: Option<Rc<Finalizer>>,
    pub value: Option<Value>,
    pub meta: Option<Metadata>,
}

impl Record {
    /// Run the finalizer against the live value, when both are present.
    pub fn finalize(&self) {
        if let (Some(finalizer), Some(value)) = (&self.finalizer, &self.value) {
            finalizer.run(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_order_by_progress() {
        assert!(State::Absent < State::Located);
        assert!(State::Located < State::Loaded);
        assert!(State::Loaded < State::Initializing);
        assert!(State::Initializing < State::Ready);
    }

    #[test]
    fn test_new_records_start_absent() {
        let record = Record::default();
        assert_eq!(record.state, State::Absent);
        assert!(!record.errored);
        assert!(record.value.is_none());
    }
}
