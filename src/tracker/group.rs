//! Tracker Group and Rollup Scheduling
//!
//! A `TrackerGroup` owns the set of root trackers, the buffer capacities
//! every tracker inherits, and the rollup cadence. The `RollupDriver` is the
//! single background task that ticks the group once per second, cascading
//! second/minute/hour rollups through the whole tree in order.

use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::interval;
use tracing::{debug, info};

use super::node::Tracker;
use super::window::Window;
use super::{TrackerError, TrackerKey};
use crate::config::{BufferCapacities, TrackerConfig};

/// Owns the root trackers for a set of keys and drives their rollup clock.
///
/// One group is created per process (or per independent counter family) and
/// lives for the process lifetime; roots are created lazily on first
/// reference to an unseen key.
pub struct TrackerGroup<K: TrackerKey> {
    roots: RwLock<HashMap<K, Arc<Tracker<K>>, RandomState>>,
    capacities: BufferCapacities,
    /// Ticks between minute rollups (60 with default capacities).
    minute_every: u64,
    /// Ticks between hour rollups (3600 with default capacities).
    hour_every: u64,
    tick_interval: Duration,
    ticks: AtomicU64,
}

impl<K: TrackerKey> TrackerGroup<K> {
    /// Create a group with the default 60/60/24 capacities and a 1-second
    /// tick.
    pub fn new() -> Self {
        Self::from_config(&TrackerConfig::default())
    }

    /// Create a group from a validated configuration.
    pub fn with_config(config: &TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: &TrackerConfig) -> Self {
        TrackerGroup {
            roots: RwLock::new(HashMap::default()),
            capacities: config.capacities(),
            minute_every: config.minute_slots as u64,
            hour_every: (config.minute_slots * config.hour_slots) as u64,
            tick_interval: config.tick_interval(),
            ticks: AtomicU64::new(0),
        }
    }

    /// Buffer capacities trackers in this group are built with.
    pub fn capacities(&self) -> BufferCapacities {
        self.capacities
    }

    /// Return the root tracker for `key`, creating one if needed.
    ///
    /// Roots never propagate increments upward. Concurrent first references
    /// to the same unseen key resolve to exactly one tracker.
    pub fn tracker(&self, key: K) -> Result<Arc<Tracker<K>>, TrackerError> {
        if !key.is_valid() {
            return Err(TrackerError::InvalidKey);
        }

        if let Some(existing) = self.roots.read().get(&key) {
            return Ok(Arc::clone(existing));
        }

        let mut roots = self.roots.write();
        let root = roots
            .entry(key.clone())
            .or_insert_with(|| Tracker::new_root(key, self.capacities));
        Ok(Arc::clone(root))
    }

    /// Snapshot of all root trackers.
    pub fn roots(&self) -> Vec<Arc<Tracker<K>>> {
        self.roots.read().values().cloned().collect()
    }

    /// Number of root trackers.
    pub fn root_count(&self) -> usize {
        self.roots.read().len()
    }

    /// Sum of `window`'s amount over all roots — the all-keys total for that
    /// window.
    pub fn total(&self, window: Window) -> u64 {
        self.roots
            .read()
            .values()
            .map(|root| window.amount(root))
            .sum()
    }

    /// Up to `n` roots ranked from high to low by `window`.
    pub fn highest(&self, window: Window, n: usize) -> Vec<Arc<Tracker<K>>> {
        window.highest(self.roots(), n)
    }

    /// Up to `n` roots ranked from low to high by `window`.
    pub fn lowest(&self, window: Window, n: usize) -> Vec<Arc<Tracker<K>>> {
        window.lowest(self.roots(), n)
    }

    /// Close the current second on every root, cascading through the tree.
    /// Scheduler-only; ranking and rendering callers must not call this.
    pub fn roll_second(&self) {
        for root in self.roots.read().values() {
            root.roll_second();
        }
    }

    /// Roll completed minutes into the hour buffers. Scheduler-only.
    pub fn roll_minute(&self) {
        for root in self.roots.read().values() {
            root.roll_minute();
        }
    }

    /// Roll completed hours into the day buffers. Scheduler-only.
    pub fn roll_hour(&self) {
        for root in self.roots.read().values() {
            root.roll_hour();
        }
    }

    /// One scheduler tick.
    ///
    /// Always rolls the second; every `minute_every`th tick also rolls the
    /// minute, and every `hour_every`th tick the hour. The order second →
    /// minute → hour guarantees each window only summarizes completed
    /// lower-resolution windows, never the bucket still accumulating.
    pub fn tick(&self) {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;

        self.roll_second();
        if tick % self.minute_every == 0 {
            debug!(tick, roots = self.root_count(), "rolled minute windows");
            self.roll_minute();
        }
        if tick % self.hour_every == 0 {
            debug!(tick, roots = self.root_count(), "rolled hour windows");
            self.roll_hour();
        }
    }

    /// Number of ticks driven so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Configured tick period for the rollup driver.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

impl<K: TrackerKey> Default for TrackerGroup<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stop signal for a running [`RollupDriver`].
#[derive(Clone)]
pub struct ShutdownHandle {
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    /// Signal the driver to stop after its current tick.
    pub fn stop(&self) {
        self.notify.notify_one();
    }
}

/// The single background scheduler driving a group's rollups.
///
/// Exactly one driver runs per group; it is the only writer of the tree's
/// ring buffers, so no locking is needed around buffer writes.
pub struct RollupDriver<K: TrackerKey> {
    group: Arc<TrackerGroup<K>>,
    shutdown: Arc<Notify>,
}

impl<K: TrackerKey> RollupDriver<K> {
    pub fn new(group: Arc<TrackerGroup<K>>) -> Self {
        RollupDriver {
            group,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle for stopping this driver from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            notify: Arc::clone(&self.shutdown),
        }
    }

    /// Run the rollup loop until a stop signal arrives.
    pub async fn run(self) {
        let period = self.group.tick_interval();
        let mut tick = interval(period);

        // An interval's first tick completes immediately; consume it so the
        // first rollup happens one full period after startup.
        tick.tick().await;

        info!(period_ms = period.as_millis() as u64, "rollup driver started");

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    self.group.tick();
                }
                _ = self.shutdown.notified() => {
                    info!(ticks = self.group.tick_count(), "rollup driver stopped");
                    break;
                }
            }
        }
    }
}
