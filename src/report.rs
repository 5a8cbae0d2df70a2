//! Insight report assembly
//!
//! Bundles every analytic into a single JSON-encodable payload for the
//! presentation layer (or a sync boundary). The engine itself stays pure;
//! the caller supplies the entry snapshot, an optional cycle model, and
//! the current instant.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::correlation::tag_correlations;
use crate::cycle::{average_flow_intensity, flow_history, CycleModel};
use crate::error::EngineError;
use crate::series::{
    cycle_day_series, daily_series, mood_distribution, time_of_day_series, weekday_series,
};
use crate::stats::{statistics, trend_slope, TrendDirection};
use crate::types::{
    CycleDayPoint, CycleStatus, DailyPoint, FlowLevel, MoodBucket, MoodEntry, MoodStatistics,
    StopWeekInterval, TagCorrelation, TimeOfDayPoint, WeekdayPoint, TREND_WINDOW_DAYS,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Stop-week predictions included in the cycle section
const PREDICTED_STOP_WEEKS: usize = 3;

/// Trailing window for the daily series (days)
const DAILY_SERIES_WINDOW: i64 = 30;

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Trend slope together with its display reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSummary {
    pub slope: f64,
    pub direction: TrendDirection,
    pub window_days: i64,
}

/// Cycle-phase section, present only when a configuration exists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSection {
    pub status: CycleStatus,
    pub upcoming_stop_weeks: Vec<StopWeekInterval>,
    pub cycle_days: Vec<CycleDayPoint>,
    /// Flow recorded in the current month, one label per day
    pub flow_history: BTreeMap<chrono::NaiveDate, FlowLevel>,
    /// Mean flow intensity over the trailing 30 days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_flow_intensity: Option<f64>,
}

/// Complete analytics payload over one entry snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub statistics: MoodStatistics,
    pub trend: TrendSummary,
    pub daily: Vec<DailyPoint>,
    pub weekday: Vec<WeekdayPoint>,
    pub time_of_day: Vec<TimeOfDayPoint>,
    pub distribution: Vec<MoodBucket>,
    pub correlations: Vec<TagCorrelation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<CycleSection>,
}

/// Builds insight reports with a stable instance id for provenance
pub struct ReportBuilder {
    instance_id: String,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    /// Create a builder with a fresh instance id
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a builder with a specific instance id
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Assemble the full report.
    ///
    /// The cycle section is included only when `cycle_model` carries a
    /// configuration; an unconfigured model contributes nothing rather
    /// than a guessed day 1.
    pub fn build(
        &self,
        entries: &[MoodEntry],
        cycle_model: Option<&CycleModel>,
        now: DateTime<Utc>,
    ) -> InsightReport {
        let today = now.date_naive();
        let slope = trend_slope(entries, now, TREND_WINDOW_DAYS);

        let cycle = cycle_model
            .and_then(|model| model.configuration().map(|cfg| (model, cfg)))
            .map(|(model, cfg)| CycleSection {
                status: model.status(today),
                upcoming_stop_weeks: model.predict_stop_weeks(PREDICTED_STOP_WEEKS, today),
                cycle_days: cycle_day_series(entries, cfg),
                flow_history: flow_history(entries, today.year(), today.month()),
                average_flow_intensity: average_flow_intensity(
                    entries,
                    today - Duration::days(DAILY_SERIES_WINDOW - 1),
                    today,
                ),
            });

        InsightReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: now.to_rfc3339(),
            statistics: statistics(entries),
            trend: TrendSummary {
                slope,
                direction: TrendDirection::from_slope(slope),
                window_days: TREND_WINDOW_DAYS,
            },
            daily: daily_series(entries, today, DAILY_SERIES_WINDOW),
            weekday: weekday_series(entries),
            time_of_day: time_of_day_series(entries),
            distribution: mood_distribution(entries),
            correlations: tag_correlations(entries),
            cycle,
        }
    }

    /// Assemble the report and encode it as pretty JSON
    pub fn build_json(
        &self,
        entries: &[MoodEntry],
        cycle_model: Option<&CycleModel>,
        now: DateTime<Utc>,
    ) -> Result<String, EngineError> {
        let report = self.build(entries, cycle_model, now);
        serde_json::to_string_pretty(&report).map_err(EngineError::JsonError)
    }
}
