pub mod config;
pub mod report;
pub mod tracker;

pub use config::{BufferCapacities, TrackerConfig};
pub use report::{bar, leaderboard, summary, LeaderboardEntry};
pub use tracker::{
    RingBuffer, RollupDriver, ShutdownHandle, Tracker, TrackerError, TrackerGroup, TrackerKey,
    Window,
};
