//! LRU replacement policy for the buffer pool.

use std::hash::Hash;

use hashlink::LinkedHashMap;
use parking_lot::Mutex;

/// Tracks eviction candidates in least-recently-used order.
///
/// The replacer holds the set of frames that currently may be evicted
/// (resident and unpinned). [`insert`](Self::insert) marks an element most
/// recently used, [`victim`](Self::victim) pops the least recently used
/// one, and [`erase`](Self::erase) withdraws an element that got pinned
/// again.
///
/// Backed by a linked hash map, so every operation is O(1). All
/// operations are linearizable; the internal latch makes the replacer
/// safe to share across threads on its own.
#[derive(Debug)]
pub struct LruReplacer<T: Hash + Eq> {
    inner: Mutex<LinkedHashMap<T, ()>>,
}

impl<T: Hash + Eq> Default for LruReplacer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq> LruReplacer<T> {
    /// Creates an empty replacer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LinkedHashMap::new()),
        }
    }

    /// Marks `value` as most recently used.
    ///
    /// If `value` is already tracked it moves to the most-recently-used
    /// end; repeated insertion does not grow the replacer.
    pub fn insert(&self, value: T) {
        let mut inner = self.inner.lock();
        // Re-inserting must move the element, not duplicate it
        inner.remove(&value);
        inner.insert(value, ());
    }

    /// Removes and returns the least recently used element.
    ///
    /// Returns `None` if the replacer is empty.
    pub fn victim(&self) -> Option<T> {
        self.inner.lock().pop_front().map(|(value, ())| value)
    }

    /// Removes `value` if present; returns whether a removal occurred.
    pub fn erase(&self, value: &T) -> bool {
        self.inner.lock().remove(value).is_some()
    }

    /// Returns the number of eviction candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns whether the replacer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
