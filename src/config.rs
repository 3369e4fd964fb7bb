//! Tracker configuration
//!
//! Buffer capacities and rollup cadence for a tracker group. Loadable from
//! TOML for embedding in a host application's config file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::tracker::TrackerError;

/// Ring-buffer slot counts inherited by every tracker in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacities {
    /// Slots in the minute buffer (one per elapsed second).
    pub minute_slots: usize,
    /// Slots in the hour buffer (one per elapsed minute).
    pub hour_slots: usize,
    /// Slots in the day buffer (one per elapsed hour).
    pub day_slots: usize,
}

impl Default for BufferCapacities {
    fn default() -> Self {
        BufferCapacities {
            minute_slots: 60,
            hour_slots: 60,
            day_slots: 24,
        }
    }
}

/// Configuration for a tracker group and its rollup driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Slots in each tracker's minute buffer. One slot per elapsed second.
    pub minute_slots: usize,
    /// Slots in each tracker's hour buffer. One slot per elapsed minute.
    /// Also the number of minute rollups between hour rollups.
    pub hour_slots: usize,
    /// Slots in each tracker's day buffer. One slot per elapsed hour.
    pub day_slots: usize,
    /// Scheduler tick period in milliseconds. One tick rolls one second.
    pub tick_interval_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            minute_slots: 60,
            hour_slots: 60,
            day_slots: 24,
            tick_interval_ms: 1000,
        }
    }
}

impl TrackerConfig {
    /// Check that every buffer capacity is positive and the tick period is
    /// non-zero. Called by `TrackerGroup::with_config` before any buffer is
    /// built, so invalid capacities fail fast at configuration time.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.minute_slots == 0 {
            return Err(TrackerError::InvalidCapacity {
                buffer: "minute_slots",
            });
        }
        if self.hour_slots == 0 {
            return Err(TrackerError::InvalidCapacity {
                buffer: "hour_slots",
            });
        }
        if self.day_slots == 0 {
            return Err(TrackerError::InvalidCapacity { buffer: "day_slots" });
        }
        if self.tick_interval_ms == 0 {
            return Err(TrackerError::InvalidTickInterval);
        }
        Ok(())
    }

    /// Parse and validate a config from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, TrackerError> {
        let config: TrackerConfig = toml::from_str(raw).map_err(TrackerError::InvalidConfig)?;
        config.validate()?;
        Ok(config)
    }

    /// Buffer capacities for trackers built under this config.
    pub fn capacities(&self) -> BufferCapacities {
        BufferCapacities {
            minute_slots: self.minute_slots,
            hour_slots: self.hour_slots,
            day_slots: self.day_slots,
        }
    }

    /// Scheduler tick period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
