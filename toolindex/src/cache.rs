//! Version-stamped derived views with at-most-once rebuilds.
//!
//! A [`StampedCache`] holds a materialized view of some state together with
//! the state version it was built at. [`snapshot`] serves the view under a
//! shared lock while it is fresh. When stale, it escalates to the exclusive
//! lock, re-checks freshness (another caller may have rebuilt in between), and
//! only then rebuilds. Concurrent readers that all observed a stale view
//! therefore serialize on the write lock and exactly one of them pays for the
//! rebuild.

use std::sync::Arc;

use parking_lot::RwLock;

/// Immutable view handed out to readers.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub items: Arc<[T]>,
    pub version: u64,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            version: self.version,
        }
    }
}

#[derive(Debug)]
pub struct StampedCache<T> {
    items: Option<Arc<[T]>>,
    dirty: bool,
    built_at: u64,
    builds: usize,
}

impl<T> Default for StampedCache<T> {
    fn default() -> Self {
        Self {
            items: None,
            dirty: true,
            built_at: 0,
            builds: 0,
        }
    }
}

impl<T> StampedCache<T> {
    /// The cached view, if it was built at `version` and not invalidated since.
    pub fn fresh(&self, version: u64) -> Option<Snapshot<T>> {
        if self.dirty || self.built_at != version {
            return None;
        }
        self.items.as_ref().map(|items| Snapshot {
            items: Arc::clone(items),
            version,
        })
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn store(&mut self, items: Vec<T>, version: u64) -> Snapshot<T> {
        let items: Arc<[T]> = items.into();
        self.items = Some(Arc::clone(&items));
        self.dirty = false;
        self.built_at = version;
        self.builds += 1;
        Snapshot { items, version }
    }

    /// Number of rebuilds performed so far.
    pub fn builds(&self) -> usize {
        self.builds
    }
}

/// State that owns a [`StampedCache`] over a view derived from itself.
pub trait Materialize {
    type Item;

    fn version(&self) -> u64;
    fn cache(&self) -> &StampedCache<Self::Item>;
    fn cache_mut(&mut self) -> &mut StampedCache<Self::Item>;
    /// Build the view from scratch.
    fn materialize(&self) -> Vec<Self::Item>;

    /// Rebuild unconditionally. Caller holds exclusive access.
    fn rebuild(&mut self) -> Snapshot<Self::Item> {
        let items = self.materialize();
        let version = self.version();
        self.cache_mut().store(items, version)
    }
}

/// Fetch a fresh view of the state behind `lock`, rebuilding at most once.
pub fn snapshot<S: Materialize>(lock: &RwLock<S>) -> Snapshot<S::Item> {
    {
        let state = lock.read();
        if let Some(snap) = state.cache().fresh(state.version()) {
            return snap;
        }
    }

    let mut state = lock.write();
    if let Some(snap) = state.cache().fresh(state.version()) {
        return snap;
    }
    state.rebuild()
}
