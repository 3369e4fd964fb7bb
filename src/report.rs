//! Usage Reports
//!
//! Turns a tracker group's raw counters into ranked leaderboards and short
//! text summaries with percentage activity bars. This is the read-only
//! consumer side of the engine: it never calls rollup methods.

use serde::Serialize;

use crate::tracker::{TrackerGroup, TrackerKey, Window};

const ACTIVE_BLOCK: char = '\u{2588}';
const EMPTY_BLOCK: char = '\u{200b}';

/// One ranked row of a leaderboard, export-friendly for JSON scrapes.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub key: String,
    pub amount: u64,
    /// Share of the group total for the window, in whole percent.
    pub percent: u64,
}

/// Top-`n` roots of `group` by `window`, with each entry's share of the
/// group total. Entries with a zero group total get zero percent.
pub fn leaderboard<K: TrackerKey>(
    group: &TrackerGroup<K>,
    window: Window,
    n: usize,
) -> Vec<LeaderboardEntry> {
    let total = group.total(window);

    group
        .highest(window, n)
        .into_iter()
        .map(|tracker| {
            let amount = window.amount(&tracker);
            LeaderboardEntry {
                key: tracker.key().to_string(),
                amount,
                percent: if total == 0 { 0 } else { amount * 100 / total },
            }
        })
        .collect()
}

/// Fixed-width text activity bar for a percentage, wrapped in backticks.
pub fn bar(percent: u64, width: usize) -> String {
    let active = (percent as f32 / 100.0 * width as f32) as usize;
    let mut out = String::with_capacity(width + 8);

    out.push('`');
    out.push(EMPTY_BLOCK);
    for i in 0..width {
        out.push(if i < active { ACTIVE_BLOCK } else { ' ' });
    }
    out.push(EMPTY_BLOCK);
    out.push('`');
    out
}

/// Multi-line text summary of the top-`n` keys for a window.
///
/// Shape: a total count line followed by one `bar percent **key** (amount)`
/// line per entry, or a placeholder when nothing has been logged.
pub fn summary<K: TrackerKey>(group: &TrackerGroup<K>, window: Window, n: usize) -> String {
    let total = group.total(window);
    if total == 0 {
        return "No events logged.".to_string();
    }

    let lines: Vec<String> = leaderboard(group, window, n)
        .into_iter()
        .map(|entry| {
            format!(
                "{} {}% **{}** ({})",
                bar(entry.percent, 15),
                entry.percent,
                entry.key,
                entry.amount
            )
        })
        .collect();

    format!("Count: {}\n{}", total, lines.join("\n"))
}
