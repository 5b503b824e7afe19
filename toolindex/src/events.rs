//! Change notification.
//!
//! Every successful mutation produces one [`ChangeEvent`]. Listeners are
//! snapshotted while the index lock is held and invoked, in registration
//! order, after it is released. A listener therefore runs on the mutating
//! caller's thread and must not assume the index still reflects the event's
//! version by the time it runs.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use toolmodel::ToolBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Registered,
    Updated,
    BackendRemoved,
    ToolRemoved,
    Refreshed,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Registered => "registered",
            ChangeType::Updated => "updated",
            ChangeType::BackendRemoved => "backend_removed",
            ChangeType::ToolRemoved => "tool_removed",
            ChangeType::Refreshed => "refreshed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub change_type: ChangeType,
    /// Absent for [`ChangeType::Refreshed`].
    pub tool_id: Option<String>,
    /// The backend registered or removed. Absent for [`ChangeType::Refreshed`].
    pub backend: Option<ToolBackend>,
    /// Index version after the mutation.
    pub version: u64,
}

pub type ChangeListener = Arc<dyn Fn(&ChangeEvent) + Send + Sync + 'static>;

/// Listener list keyed by a monotonically assigned ID, so removal never
/// depends on list position.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<(u64, ChangeListener)>,
    next_id: u64,
}

impl Listeners {
    pub fn add(&mut self, listener: ChangeListener) -> u64 {
        self.next_id += 1;
        self.entries.push((self.next_id, listener));
        self.next_id
    }

    /// Returns false if `id` was already removed.
    pub fn remove(&mut self, id: u64) -> bool {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<ChangeListener> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub(crate) fn notify(listeners: &[ChangeListener], event: &ChangeEvent) {
    for listener in listeners {
        listener(event);
    }
}

type CancelFn = Box<dyn Fn() + Send + Sync + 'static>;

/// Handle returned by `on_change`. Dropping it keeps the listener registered;
/// call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    cancel: Option<CancelFn>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub(crate) fn noop() -> Self {
        Self { cancel: None }
    }

    /// Remove the listener. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        if let Some(cancel) = &self.cancel {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
