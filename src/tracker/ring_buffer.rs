//! Fixed-Capacity Ring Buffer for Window Bucket Totals
//!
//! A circular accumulator holding the last `C` completed bucket totals of a
//! single window resolution. Written only by the rollup scheduler; read
//! lock-free by any number of query threads.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Circular buffer of 64-bit bucket totals with a fixed capacity.
///
/// Writing overwrites the oldest retained value, so at most `capacity`
/// generations of data are kept. Unwritten slots contribute zero to sums.
pub struct RingBuffer {
    slots: Box<[AtomicU64]>,
    /// Index of the slot the next `put` will overwrite.
    cursor: AtomicUsize,
}

impl RingBuffer {
    /// Create a zero-initialized buffer with the given capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. User-supplied capacities are validated
    /// earlier by [`TrackerConfig::validate`](crate::config::TrackerConfig::validate),
    /// so reaching this panic is a programming error.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");

        let slots: Box<[AtomicU64]> = (0..capacity).map(|_| AtomicU64::new(0)).collect();

        RingBuffer {
            slots,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of slots in this buffer.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Overwrite the slot at the cursor with `value` and advance the cursor.
    ///
    /// O(1), no allocation. Only the single scheduler thread calls this;
    /// concurrent readers may observe the slot and cursor mid-update, which
    /// is accepted (counters are for observability, not accounting).
    pub fn put(&self, value: u64) {
        let cursor = self.cursor.load(Ordering::SeqCst);
        self.slots[cursor].store(value, Ordering::SeqCst);
        self.cursor
            .store((cursor + 1) % self.slots.len(), Ordering::SeqCst);
    }

    /// Sum of all slots. O(capacity).
    pub fn sum(&self) -> u64 {
        self.slots.iter().map(|s| s.load(Ordering::SeqCst)).sum()
    }

    /// Sum of the `n` most recently written slots, walking backward from the
    /// slot immediately before the cursor. Values of `n` greater than the
    /// capacity are clamped to the capacity. O(n).
    pub fn sum_last(&self, n: usize) -> u64 {
        let capacity = self.slots.len();
        let n = n.min(capacity);
        let cursor = self.cursor.load(Ordering::SeqCst);

        (1..=n)
            .map(|back| self.slots[(cursor + capacity - back) % capacity].load(Ordering::SeqCst))
            .sum()
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("cursor", &self.cursor.load(Ordering::SeqCst))
            .field("sum", &self.sum())
            .finish()
    }
}
