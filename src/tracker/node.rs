//! Tracker Node
//!
//! One node in a key-addressed tree of counters. Tracks usages of its key
//! for the last second, minute, hour, day and all time. Each node owns its
//! window buffers and its children; the parent link is non-owning and used
//! only for recursive increment propagation.

use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::ring_buffer::RingBuffer;
use super::{TrackerError, TrackerKey};
use crate::config::BufferCapacities;

/// Tracks usages of a given key for the last second, minute, hour, day and
/// total usages.
///
/// Trackers are shared as `Arc<Tracker<K>>` and never individually removed;
/// the tree only grows. Children are destroyed with their parent.
pub struct Tracker<K: TrackerKey> {
    key: K,
    parent: Option<Weak<Tracker<K>>>,
    recursive_increment: bool,
    capacities: BufferCapacities,
    /// In-progress accumulator for the current second.
    second: AtomicU64,
    /// Cumulative count for the node's lifetime. Never decreases; rollups
    /// never touch it.
    total: AtomicU64,
    /// One slot per elapsed second.
    minute: RingBuffer,
    /// One slot per elapsed minute.
    hour: RingBuffer,
    /// One slot per elapsed hour.
    day: RingBuffer,
    children: RwLock<HashMap<K, Arc<Tracker<K>>, RandomState>>,
}

impl<K: TrackerKey> Tracker<K> {
    fn new(
        key: K,
        parent: Option<Weak<Tracker<K>>>,
        recursive_increment: bool,
        capacities: BufferCapacities,
    ) -> Arc<Self> {
        Arc::new(Tracker {
            key,
            parent,
            recursive_increment,
            capacities,
            second: AtomicU64::new(0),
            total: AtomicU64::new(0),
            minute: RingBuffer::new(capacities.minute_slots),
            hour: RingBuffer::new(capacities.hour_slots),
            day: RingBuffer::new(capacities.day_slots),
            children: RwLock::new(HashMap::default()),
        })
    }

    /// Create a root tracker. Roots have no parent to propagate to, so
    /// `recursive_increment` is always false for them.
    pub(crate) fn new_root(key: K, capacities: BufferCapacities) -> Arc<Self> {
        Tracker::new(key, None, false, capacities)
    }

    /// This tracker's key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// This tracker's parent, if it is still alive. `None` for roots.
    pub fn parent(&self) -> Option<Arc<Tracker<K>>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Whether increments on this tracker propagate to its ancestors.
    pub fn recursive_increment(&self) -> bool {
        self.recursive_increment
    }

    /// Increment this tracker's usages by one.
    pub fn increment(&self) {
        self.increment_by(1);
    }

    /// Increment this tracker's usages by `amount`.
    ///
    /// If recursive increment is enabled, the parent is incremented first,
    /// until the root tracker is updated. Lock-free.
    pub fn increment_by(&self, amount: u64) {
        if self.recursive_increment {
            if let Some(parent) = self.parent() {
                parent.increment_by(amount);
            }
        }
        self.second.fetch_add(amount, Ordering::SeqCst);
        self.total.fetch_add(amount, Ordering::SeqCst);
    }

    /// Return the child tracker for `key`, creating one if needed.
    ///
    /// The child inherits this tracker's buffer capacities and uses the
    /// caller-specified recursive increment policy. Concurrent first-time
    /// calls for the same unseen key resolve to exactly one shared instance;
    /// the first caller's policy wins.
    pub fn child(
        self: &Arc<Self>,
        key: K,
        recursive_increment: bool,
    ) -> Result<Arc<Tracker<K>>, TrackerError> {
        if !key.is_valid() {
            return Err(TrackerError::InvalidKey);
        }

        // Fast path: already present.
        if let Some(existing) = self.children.read().get(&key) {
            return Ok(Arc::clone(existing));
        }

        let mut children = self.children.write();
        let child = children.entry(key.clone()).or_insert_with(|| {
            Tracker::new(
                key,
                Some(Arc::downgrade(self)),
                recursive_increment,
                self.capacities,
            )
        });
        Ok(Arc::clone(child))
    }

    /// Snapshot of the existing child trackers.
    pub fn children(&self) -> Vec<Arc<Tracker<K>>> {
        self.children.read().values().cloned().collect()
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.read().len()
    }

    /// Usages registered in the current second.
    pub fn second_usages(&self) -> u64 {
        self.second.load(Ordering::SeqCst)
    }

    /// Usages registered in the last minute: the completed seconds plus the
    /// in-progress one.
    pub fn minute_usages(&self) -> u64 {
        self.minute.sum() + self.second_usages()
    }

    /// Usages registered in the last hour.
    ///
    /// Sums the last 59 completed minutes (not 60) plus the full minute
    /// buffer and the in-progress second. The oldest completed slot is left
    /// out of the sum; see the rollup scenario tests, which pin this
    /// asymmetry as documented behavior.
    pub fn hourly_usages(&self) -> u64 {
        self.hour.sum_last(59) + self.minute.sum() + self.second_usages()
    }

    /// Usages registered in the last day. Same last-`C-1` asymmetry as
    /// [`hourly_usages`](Self::hourly_usages), with `sum_last(23)` on the
    /// day buffer.
    pub fn daily_usages(&self) -> u64 {
        self.day.sum_last(23) + self.hour.sum_last(59) + self.minute.sum() + self.second_usages()
    }

    /// Total usages registered over this tracker's lifetime.
    pub fn total_usages(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Buffer of per-second totals for the last minute.
    pub fn minute_buffer(&self) -> &RingBuffer {
        &self.minute
    }

    /// Buffer of per-minute totals for the last hour.
    pub fn hour_buffer(&self) -> &RingBuffer {
        &self.hour
    }

    /// Buffer of per-hour totals for the last day.
    pub fn day_buffer(&self) -> &RingBuffer {
        &self.day
    }

    /// Close the current second: swap the second counter to zero, write the
    /// pre-swap value into the minute buffer, and recurse into children.
    ///
    /// The atomic swap means an increment racing with the rollover lands in
    /// exactly one window — either the bucket being written or the next one.
    /// Invoked only by the owning group's scheduler.
    pub(crate) fn roll_second(&self) {
        self.minute.put(self.second.swap(0, Ordering::SeqCst));
        for child in self.children.read().values() {
            child.roll_second();
        }
    }

    /// Write the minute buffer's sum into the hour buffer, replacing the
    /// oldest entry, and recurse into children.
    pub(crate) fn roll_minute(&self) {
        self.hour.put(self.minute.sum());
        for child in self.children.read().values() {
            child.roll_minute();
        }
    }

    /// Write the hour buffer's sum into the day buffer, replacing the
    /// oldest entry, and recurse into children.
    pub(crate) fn roll_hour(&self) {
        self.day.put(self.hour.sum());
        for child in self.children.read().values() {
            child.roll_hour();
        }
    }
}

impl<K: TrackerKey> std::fmt::Debug for Tracker<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("key", &self.key)
            .field("second", &self.second_usages())
            .field("total", &self.total_usages())
            .field("children", &self.child_count())
            .finish()
    }
}
