//! Cyclesense - on-device analytics engine for mood and cycle tracking
//!
//! Cyclesense turns a log of timestamped mood entries, plus an optional
//! pill-cycle configuration, into the numbers a tracking app displays:
//! summary statistics, trend slope, daily / weekday / time-of-day /
//! cycle-day series, a mood histogram, tag correlations, and cycle-phase
//! answers (current day, PMS window, predicted stop weeks).
//!
//! The engine performs no I/O and keeps no clock: entries arrive as
//! already-materialized collections, and "now" is an explicit parameter,
//! so every computation is deterministic and safe to run concurrently
//! over immutable snapshots.
//!
//! ## Modules
//!
//! - **cycle**: day-in-cycle arithmetic, phase classification, stop-week
//!   prediction, flow history
//! - **stats**, **series**, **correlation**: pure aggregation over entry
//!   snapshots
//! - **report**: one JSON payload bundling everything for display

pub mod correlation;
pub mod cycle;
pub mod error;
pub mod report;
pub mod series;
pub mod stats;
pub mod types;

// FFI bindings for the host app (always available for cdylib/staticlib builds)
pub mod ffi;

pub use correlation::tag_correlations;
pub use cycle::{average_flow_intensity, flow_history, CycleModel};
pub use error::EngineError;
pub use report::{InsightReport, ReportBuilder};
pub use series::{
    cycle_day_series, daily_series, mood_distribution, time_of_day_series, weekday_series,
};
pub use stats::{statistics, trend_slope, TrendDirection};
pub use types::{
    CycleConfiguration, CyclePhase, CycleStatus, FlowLevel, MoodEntry, MoodStatistics,
    StopWeekInterval, TagCorrelation,
};

/// Engine version embedded in every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name embedded in every report
pub const PRODUCER_NAME: &str = "cyclesense";
