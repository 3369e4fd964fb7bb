//! Hierarchical Multi-Resolution Usage Tracking
//!
//! Counts keyed events into decaying windows (second, minute, hour, day,
//! all-time) with bounded memory:
//!
//! - **RingBuffer** — fixed-capacity circular accumulator of bucket totals
//! - **Tracker** — one node in a key-addressed tree of counters
//! - **TrackerGroup** — owns the root trackers and the rollup cadence
//! - **RollupDriver** — single background task ticking the group at 1 Hz
//! - **Window** — query view selecting one of the five window accessors
//!
//! Increments are lock-free and safe under unbounded concurrent callers;
//! rollups are driven by exactly one scheduler.

mod group;
mod node;
mod ring_buffer;
mod window;

pub use group::{RollupDriver, ShutdownHandle, TrackerGroup};
pub use node::Tracker;
pub use ring_buffer::RingBuffer;
pub use window::Window;

use std::fmt;
use std::hash::Hash;

/// Key type usable to identify a tracker among its siblings.
///
/// Keys must be stable for the lifetime of the tree (trackers are never
/// renamed) and non-empty; `is_valid` is checked at the `tracker`/`child`
/// call boundary.
pub trait TrackerKey: Eq + Hash + Ord + Clone + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Whether this key is acceptable at the call boundary.
    fn is_valid(&self) -> bool {
        true
    }
}

impl TrackerKey for String {
    fn is_valid(&self) -> bool {
        !self.is_empty()
    }
}

impl TrackerKey for &'static str {
    fn is_valid(&self) -> bool {
        !self.is_empty()
    }
}

impl TrackerKey for u64 {}

/// Error type for tracker configuration and call-boundary validation.
///
/// Steady-state operations are total over their valid domain; everything
/// here surfaces at construction or at the key boundary.
#[derive(Debug)]
pub enum TrackerError {
    /// A ring-buffer capacity in the configuration is zero.
    InvalidCapacity { buffer: &'static str },
    /// An empty key was passed to `tracker` or `child`.
    InvalidKey,
    /// The scheduler tick period in the configuration is zero.
    InvalidTickInterval,
    /// The configuration document failed to parse.
    InvalidConfig(toml::de::Error),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::InvalidCapacity { buffer } => {
                write!(f, "ring buffer capacity `{}` must be positive", buffer)
            }
            TrackerError::InvalidKey => write!(f, "tracker keys must be non-empty"),
            TrackerError::InvalidTickInterval => {
                write!(f, "scheduler tick interval must be non-zero")
            }
            TrackerError::InvalidConfig(e) => write!(f, "invalid tracker config: {}", e),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}
