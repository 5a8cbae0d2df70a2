//! Core types for the cyclesense engine
//!
//! This module defines the data structures that cross the engine boundary:
//! mood entries and the cycle configuration on the way in, statistics,
//! series points, and correlation rows on the way out.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest loggable mood score
pub const MIN_MOOD_SCORE: f64 = -5.0;

/// Highest loggable mood score
pub const MAX_MOOD_SCORE: f64 = 5.0;

/// Days before the stop week that count as the PMS window
pub const PMS_WINDOW_DAYS: u32 = 7;

/// Default trailing window for trend computation (days)
pub const TREND_WINDOW_DAYS: i64 = 7;

/// Absolute trend slope below which the trend reads as stable
pub const STABLE_TREND_THRESHOLD: f64 = 0.1;

/// Menstrual flow intensity recorded on an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowLevel {
    None,
    Spotting,
    Light,
    Medium,
    Heavy,
}

impl FlowLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowLevel::None => "none",
            FlowLevel::Spotting => "spotting",
            FlowLevel::Light => "light",
            FlowLevel::Medium => "medium",
            FlowLevel::Heavy => "heavy",
        }
    }

    /// Ordinal intensity used for averaging. `None` carries no intensity
    /// and is excluded from averages.
    pub fn intensity(&self) -> Option<f64> {
        match self {
            FlowLevel::None => None,
            FlowLevel::Spotting => Some(1.0),
            FlowLevel::Light => Some(2.0),
            FlowLevel::Medium => Some(3.0),
            FlowLevel::Heavy => Some(4.0),
        }
    }
}

/// A single logged mood entry.
///
/// Entries are created by the logging layer and are read-only inside the
/// engine; it never creates, mutates, or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: Uuid,
    /// When the entry was logged (UTC)
    pub timestamp: DateTime<Utc>,
    /// Mood score in [-5.0, 5.0]
    pub score: f64,
    /// Context tags; duplicates within one entry are not meaningful
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form note, unused by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Flow intensity, only meaningful on stop-week days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowLevel>,
}

impl MoodEntry {
    /// Create an entry with a fresh id. The score is clamped into the
    /// valid range so downstream aggregation never sees out-of-range input.
    pub fn new(timestamp: DateTime<Utc>, score: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            score: score.clamp(MIN_MOOD_SCORE, MAX_MOOD_SCORE),
            tags: Vec::new(),
            note: None,
            flow: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_flow(mut self, flow: FlowLevel) -> Self {
        self.flow = Some(flow);
        self
    }
}

/// Pill-cycle configuration, one active instance per user.
///
/// `stop_week_start` and `stop_week_end` are 1-indexed days in the cycle,
/// `1 <= stop_week_start < stop_week_end <= cycle_length`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfiguration {
    /// Pill brand label, unused by the engine
    #[serde(default)]
    pub pill_brand: String,
    /// Cycle length in days (UI offers 21-35; anything >= 2 is accepted)
    pub cycle_length: u32,
    pub stop_week_start: u32,
    pub stop_week_end: u32,
    /// Day 1 of the cycle currently in progress
    pub start_date: NaiveDate,
}

/// Phase of the cycle a given day falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Unconfigured,
    Active,
    Pms,
    StopWeek,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Unconfigured => "unconfigured",
            CyclePhase::Active => "active",
            CyclePhase::Pms => "pms",
            CyclePhase::StopWeek => "stop_week",
        }
    }
}

/// Point-in-time answer to "where am I in the cycle".
///
/// When no configuration exists, `configured` is false and the day and
/// countdown fields are absent; the engine never guesses day 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleStatus {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_day: Option<u32>,
    pub phase: CyclePhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_next_stop_week: Option<i64>,
}

impl CycleStatus {
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            cycle_day: None,
            phase: CyclePhase::Unconfigured,
            days_until_next_stop_week: None,
        }
    }
}

/// A predicted stop-week date interval, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopWeekInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Summary statistics over mood scores.
///
/// All fields are 0.0 for empty input; the engine never divides by zero
/// or returns NaN.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MoodStatistics {
    pub average: f64,
    /// Population standard deviation (divide by N)
    pub std_deviation: f64,
    pub min: f64,
    pub max: f64,
    pub entry_count: usize,
}

/// One calendar day of the daily mood series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub average_mood: f64,
    pub entry_count: usize,
    /// Union of tags logged that day, in order of first appearance
    pub tags: Vec<String>,
}

/// One day-in-cycle bucket of the cycle-day series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleDayPoint {
    /// 1-indexed day in the cycle
    pub cycle_day: u32,
    /// 0.0 when no entries landed on this cycle day
    pub average_mood: f64,
    pub entry_count: usize,
    pub is_stop_week: bool,
}

/// One weekday bucket, Monday first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayPoint {
    pub weekday: String,
    pub average_mood: f64,
    pub entry_count: usize,
}

/// Fixed time-of-day bins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bin for an hour of day: Morning [5,12), Afternoon [12,17),
    /// Evening [17,21), Night [21,24) and [0,5).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }

    /// All bins in display order
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];
}

/// One time-of-day bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDayPoint {
    pub period: TimeOfDay,
    pub average_mood: f64,
    pub entry_count: usize,
}

/// One bucket of the mood-score histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodBucket {
    /// Integer score -5..=5
    pub score: i32,
    pub count: usize,
}

/// Per-tag correlation row.
///
/// `correlation` is the tag's average-mood deviation from the overall
/// average, normalized by the score half-range and clamped to [-1, 1].
/// It is a crude heuristic, not a statistical correlation coefficient;
/// small samples inflate it and that is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCorrelation {
    pub tag: String,
    pub average_mood: f64,
    pub occurrences: usize,
    pub correlation: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entry_score_clamped_on_construction() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(MoodEntry::new(ts, 7.3).score, 5.0);
        assert_eq!(MoodEntry::new(ts, -9.0).score, -5.0);
        assert_eq!(MoodEntry::new(ts, 2.5).score, 2.5);
    }

    #[test]
    fn flow_intensity_scale() {
        assert_eq!(FlowLevel::None.intensity(), None);
        assert_eq!(FlowLevel::Spotting.intensity(), Some(1.0));
        assert_eq!(FlowLevel::Heavy.intensity(), Some(4.0));
    }

    #[test]
    fn time_of_day_bins_cover_all_hours() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
    }

    #[test]
    fn flow_level_serde_round_trip() {
        let json = serde_json::to_string(&FlowLevel::Spotting).unwrap();
        assert_eq!(json, "\"spotting\"");
        let back: FlowLevel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FlowLevel::Spotting);
    }
}
