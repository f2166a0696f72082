//! Aggregation of persisted click logs into the analytics response shape.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Days, Utc};
use serde::Serialize;

use crate::models::ClickLog;

/// Number of trailing calendar days covered by `daily_stats`, zero-filled.
pub const DAILY_WINDOW_DAYS: u64 = 7;

/// Default number of entries returned in `recent_clicks`, newest first.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Grouped view over the click logs of one short identifier.
///
/// `total_logs` counts log rows, not clicks — the authoritative click total
/// lives on the `ShortLink` counter. `unique_visitors` is a distinct-address
/// proxy, not a true visitor count: addresses get shared and rotated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickSummary {
    pub total_logs: usize,
    pub unique_visitors: usize,
    pub country_stats: BTreeMap<String, i64>,
    pub device_stats: BTreeMap<String, i64>,
    pub browser_stats: BTreeMap<String, i64>,
    /// `YYYY-MM-DD` → count for the trailing window, days with no activity
    /// included as zero.
    pub daily_stats: BTreeMap<String, i64>,
    pub recent_clicks: Vec<ClickLog>,
}

/// Summarize `logs`. Tolerates an empty slice: groupings come back empty and
/// the daily window is all zeroes. `now` is injected so the trailing window
/// is deterministic under test.
pub fn summarize(logs: &[ClickLog], now: DateTime<Utc>, recent_limit: usize) -> ClickSummary {
    let mut country_stats = BTreeMap::new();
    let mut device_stats = BTreeMap::new();
    let mut browser_stats = BTreeMap::new();
    let mut addresses = HashSet::new();

    // Zero-fill the trailing calendar days so charts render gap-free.
    let mut daily_stats = BTreeMap::new();
    let today = now.date_naive();
    for back in 0..DAILY_WINDOW_DAYS {
        if let Some(day) = today.checked_sub_days(Days::new(back)) {
            daily_stats.insert(day.format("%Y-%m-%d").to_string(), 0);
        }
    }

    for log in logs {
        *country_stats.entry(log.country.clone()).or_insert(0) += 1;
        *device_stats.entry(log.device.clone()).or_insert(0) += 1;
        *browser_stats.entry(log.browser.clone()).or_insert(0) += 1;
        addresses.insert(log.client_address.as_str());

        if let Some(when) = DateTime::<Utc>::from_timestamp(log.timestamp, 0) {
            let day = when.date_naive().format("%Y-%m-%d").to_string();
            if let Some(count) = daily_stats.get_mut(&day) {
                *count += 1;
            }
        }
    }

    let mut recent: Vec<ClickLog> = logs.to_vec();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.truncate(recent_limit);

    ClickSummary {
        total_logs: logs.len(),
        unique_visitors: addresses.len(),
        country_stats,
        device_stats,
        browser_stats,
        daily_stats,
        recent_clicks: recent,
    }
}
