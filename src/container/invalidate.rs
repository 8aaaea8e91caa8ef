//! Invalidation: direct unloads from change notifications and the cascade
//! across dependent records.

use std::collections::HashSet;
use std::rc::Rc;

use tracing::debug;

use super::record::State;
use super::{Container, SharedRecord};

impl Container {
    /// Apply pending change notifications. Returns how many records were
    /// unloaded.
    pub fn poll(&mut self) -> usize {
        let changed = self.notifier.drain();
        let count = changed.len();
        for name in changed {
            self.unload(&name);
        }
        count
    }

    /// Direct invalidation: tear down the record's value, evict its cached
    /// source and drop it back to Located, then cascade through dependents.
    /// A record that never loaded only has its cached source evicted.
    fn unload(&mut self, name: &str) {
        let Some(record) = self.records.get(name).map(Rc::clone) else {
            return;
        };
        debug!("unloading module: {name}");
        {
            let mut r = record.borrow_mut();
            if r.state == State::Ready {
                r.finalize();
            }
            if let Some(location) = &r.location {
                self.loader.evict(location);
            }
            r.state = State::Located;
            r.errored = false;
            r.deps = None;
            r.init = None;
            r.finalizer = None;
            r.value = None;
            r.meta = None;
        }

        let mut visited = HashSet::from([name.to_string()]);
        self.cascade(name, &mut visited);
    }

    /// Reset every dependent of `dep` that is Ready, or Loaded with a
    /// settled failure, and recurse through their own dependents. The
    /// visited set bounds traversal even if the stored dependency edges
    /// loop back on themselves.
    fn cascade(&mut self, dep: &str, visited: &mut HashSet<String>) {
        let dependents: Vec<(String, SharedRecord)> = self
            .records
            .iter()
            .filter(|(name, record)| {
                if visited.contains(*name) {
                    return false;
                }
                let r = record.borrow();
                let affected = r.state == State::Ready || (r.state == State::Loaded && r.errored);
                affected
                    && r.deps
                        .as_ref()
                        .is_some_and(|deps| deps.iter().any(|d| d == dep))
            })
            .map(|(name, record)| (name.clone(), Rc::clone(record)))
            .collect();

        for (name, record) in dependents {
            if !visited.insert(name.clone()) {
                continue;
            }
            debug!("invalidating module: {name}");
            {
                let mut r = record.borrow_mut();
                if r.state == State::Ready {
                    r.finalize();
                }
                r.state = State::Loaded;
                r.errored = false;
                r.value = None;
            }
            self.cascade(&name, visited);
        }
    }
}
