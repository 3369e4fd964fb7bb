//! Window Query Views
//!
//! The five canonical aggregation instances over a tracker tree — one per
//! window accessor. A `Window` is a stateless policy binding an extraction
//! function to a deterministic ordering, used by ranking callers to build
//! top-N and bottom-N views.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use super::node::Tracker;
use super::TrackerKey;

/// One of the five aggregation windows a tracker exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Second,
    Minute,
    Hour,
    Day,
    Total,
}

impl Window {
    /// All five canonical windows, coarsest last.
    pub const ALL: [Window; 5] = [
        Window::Second,
        Window::Minute,
        Window::Hour,
        Window::Day,
        Window::Total,
    ];

    /// Short lowercase name, for logs and report headers.
    pub fn label(&self) -> &'static str {
        match self {
            Window::Second => "second",
            Window::Minute => "minute",
            Window::Hour => "hour",
            Window::Day => "day",
            Window::Total => "total",
        }
    }

    /// The amount in this window for a given tracker.
    pub fn amount<K: TrackerKey>(&self, tracker: &Tracker<K>) -> u64 {
        match self {
            Window::Second => tracker.second_usages(),
            Window::Minute => tracker.minute_usages(),
            Window::Hour => tracker.hourly_usages(),
            Window::Day => tracker.daily_usages(),
            Window::Total => tracker.total_usages(),
        }
    }

    /// Order two trackers by this window's amount, ascending, breaking ties
    /// by key so rankings are stable and reproducible.
    pub fn compare<K: TrackerKey>(&self, a: &Tracker<K>, b: &Tracker<K>) -> Ordering {
        self.amount(a)
            .cmp(&self.amount(b))
            .then_with(|| a.key().cmp(b.key()))
    }

    /// Up to `n` trackers from `all`, sorted from high to low by this
    /// window's amount.
    pub fn highest<K, I>(&self, all: I, n: usize) -> Vec<Arc<Tracker<K>>>
    where
        K: TrackerKey,
        I: IntoIterator<Item = Arc<Tracker<K>>>,
    {
        let mut trackers: Vec<_> = all.into_iter().collect();
        trackers.sort_by(|a, b| self.compare(a, b).reverse());
        trackers.truncate(n);
        trackers
    }

    /// Up to `n` trackers from `all`, sorted from low to high by this
    /// window's amount.
    pub fn lowest<K, I>(&self, all: I, n: usize) -> Vec<Arc<Tracker<K>>>
    where
        K: TrackerKey,
        I: IntoIterator<Item = Arc<Tracker<K>>>,
    {
        let mut trackers: Vec<_> = all.into_iter().collect();
        trackers.sort_by(|a, b| self.compare(a, b));
        trackers.truncate(n);
        trackers
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
