//! Summary statistics and trend
//!
//! Pure functions over an entry snapshot: average / spread / extremes and
//! an ordinary-least-squares trend slope over a trailing window. Calling
//! any of them twice on the same input yields identical output.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MoodEntry, MoodStatistics, STABLE_TREND_THRESHOLD};

/// Three-way reading of a trend slope for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    /// Slopes with |slope| below the stable threshold read as stable
    pub fn from_slope(slope: f64) -> Self {
        if slope.abs() < STABLE_TREND_THRESHOLD {
            TrendDirection::Stable
        } else if slope > 0.0 {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

/// Average, population standard deviation, min and max over scores.
/// Empty input yields the all-zero sentinel, never NaN.
pub fn statistics(entries: &[MoodEntry]) -> MoodStatistics {
    if entries.is_empty() {
        return MoodStatistics::default();
    }

    let n = entries.len() as f64;
    let sum: f64 = entries.iter().map(|e| e.score).sum();
    let average = sum / n;

    let variance = entries
        .iter()
        .map(|e| (e.score - average).powi(2))
        .sum::<f64>()
        / n;

    let min = entries.iter().map(|e| e.score).fold(f64::INFINITY, f64::min);
    let max = entries
        .iter()
        .map(|e| e.score)
        .fold(f64::NEG_INFINITY, f64::max);

    MoodStatistics {
        average,
        std_deviation: variance.sqrt(),
        min,
        max,
        entry_count: entries.len(),
    }
}

/// OLS slope of score against entry order over the trailing window ending
/// at `now`.
///
/// Entries older than `window_days` (half-open at the old edge) or after
/// `now` are ignored; the remainder is sorted by timestamp and fitted
/// against index position, not elapsed time, so irregular logging gaps do
/// not skew the slope. Fewer than two points yield 0.0.
pub fn trend_slope(entries: &[MoodEntry], now: DateTime<Utc>, window_days: i64) -> f64 {
    let cutoff = now - Duration::days(window_days);
    let mut windowed: Vec<&MoodEntry> = entries
        .iter()
        .filter(|e| e.timestamp > cutoff && e.timestamp <= now)
        .collect();

    if windowed.len() < 2 {
        return 0.0;
    }
    windowed.sort_by_key(|e| e.timestamp);

    let n = windowed.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, entry) in windowed.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += entry.score;
        sum_xy += x * entry.score;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}
