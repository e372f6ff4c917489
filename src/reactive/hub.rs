use std::{fmt, time::Instant};

use serde_json::Value;
use tracing::debug;

use crate::form::{Control, ControlPath};

/// A value change delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    /// Path the listener subscribed to.
    pub path: ControlPath,
    /// Value of that control after the change.
    pub value: Value,
    pub at: Instant,
}

/// Listeners receive the change and the root of the tree it happened in.
pub type Listener = Box<dyn FnMut(&ValueChange, &mut Control)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct Entry {
    id: Subscription,
    path: ControlPath,
    listener: Listener,
}

/// Registry of value-change listeners keyed by control path.
///
/// A listener on a group also hears changes of its descendants.
#[derive(Default)]
pub struct ChangeHub {
    next_id: u64,
    entries: Vec<Entry>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        path: ControlPath,
        listener: impl FnMut(&ValueChange, &mut Control) + 'static,
    ) -> Subscription {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        debug!(path = %path, id = id.0, "listener registered");
        self.entries.push(Entry {
            id,
            path,
            listener: Box::new(listener),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }

    /// Drops every listener.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!(count = self.entries.len(), "releasing listeners");
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Notifies every listener whose path is `changed` or one of its ancestors.
    /// Returns the number of listeners invoked.
    pub fn dispatch(&mut self, changed: &ControlPath, at: Instant, root: &mut Control) -> usize {
        let mut notified = 0;
        for entry in &mut self.entries {
            if !changed.starts_with(&entry.path) {
                continue;
            }
            let Some(value) = root.get(&entry.path).map(Control::value) else {
                continue;
            };
            let change = ValueChange {
                path: entry.path.clone(),
                value,
                at,
            };
            (entry.listener)(&change, root);
            notified += 1;
        }
        if notified > 0 {
            debug!(path = %changed, notified, "value change dispatched");
        }
        notified
    }
}

impl fmt::Debug for ChangeHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeHub")
            .field(
                "paths",
                &self
                    .entries
                    .iter()
                    .map(|entry| entry.path.to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
