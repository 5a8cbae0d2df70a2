//! Cycle model
//!
//! This module answers point-in-time questions about a pill cycle:
//! current cycle day, phase classification (active / PMS / stop week),
//! predicted stop-week intervals, and the "forgotten pill" start-date
//! shift. It also carries the flow-history queries over logged entries.
//!
//! "Today" is always an explicit parameter so the model stays
//! deterministic; it never reads the wall clock itself.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::types::{
    CycleConfiguration, CyclePhase, CycleStatus, FlowLevel, MoodEntry, StopWeekInterval,
    PMS_WINDOW_DAYS,
};

/// Holds the active cycle configuration, if any.
///
/// Absence of a configuration is an ordinary state: every query returns a
/// sentinel (`false`, empty, `CycleStatus::unconfigured()`) rather than an
/// error or a guessed day 1. Mutations (`configure`, `shift_start`) must be
/// serialized by the caller relative to reads; a mutex or single-owner task
/// is enough given how small and rarely-written the state is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleModel {
    config: Option<CycleConfiguration>,
}

impl CycleModel {
    /// Create an unconfigured model
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a model from a previously saved configuration.
    /// The configuration is re-validated; a corrupted save must not
    /// produce a model that answers queries inconsistently.
    pub fn from_configuration(config: CycleConfiguration) -> Result<Self, EngineError> {
        validate(&config)?;
        Ok(Self {
            config: Some(config),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn configuration(&self) -> Option<&CycleConfiguration> {
        self.config.as_ref()
    }

    /// Replace (or create) the configuration.
    ///
    /// Fails with `InvalidConfiguration` when the stop-week ordering is
    /// violated or `start_date` lies in the future; nothing is saved on
    /// failure.
    pub fn configure(
        &mut self,
        pill_brand: String,
        cycle_length: u32,
        stop_week_start: u32,
        stop_week_end: u32,
        start_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), EngineError> {
        let config = CycleConfiguration {
            pill_brand,
            cycle_length,
            stop_week_start,
            stop_week_end,
            start_date,
        };
        validate(&config)?;
        if start_date > today {
            return Err(EngineError::InvalidConfiguration(format!(
                "start date {start_date} is in the future"
            )));
        }
        self.config = Some(config);
        Ok(())
    }

    /// 1-indexed day in the cycle for `date`, or `None` when unconfigured.
    ///
    /// Uses a true mathematical modulo, so dates before the cycle start
    /// still map onto a valid day in 1..=cycle_length.
    pub fn day_in_cycle(&self, date: NaiveDate) -> Option<u32> {
        let cfg = self.config.as_ref()?;
        Some(day_in_cycle(cfg, date))
    }

    /// Current cycle day, phase, and countdown to the next stop week
    pub fn status(&self, today: NaiveDate) -> CycleStatus {
        let cfg = match &self.config {
            Some(cfg) => cfg,
            None => return CycleStatus::unconfigured(),
        };

        let day = day_in_cycle(cfg, today);
        CycleStatus {
            configured: true,
            cycle_day: Some(day),
            phase: phase_for_day(cfg, day),
            days_until_next_stop_week: Some(days_until_stop_week(cfg, day)),
        }
    }

    /// True when `date` falls inside the stop week; false when unconfigured
    pub fn is_stop_week_day(&self, date: NaiveDate) -> bool {
        match &self.config {
            Some(cfg) => {
                let day = day_in_cycle(cfg, date);
                phase_for_day(cfg, day) == CyclePhase::StopWeek
            }
            None => false,
        }
    }

    /// True when `date` falls inside the PMS window; false when unconfigured
    pub fn is_pms_day(&self, date: NaiveDate) -> bool {
        match &self.config {
            Some(cfg) => {
                let day = day_in_cycle(cfg, date);
                phase_for_day(cfg, day) == CyclePhase::Pms
            }
            None => false,
        }
    }

    /// Predict the next `count` stop-week intervals from `today`.
    ///
    /// Returns exactly `count` intervals in chronological order; the first
    /// is the soonest interval whose end date is not already past. The
    /// current stop week, if in progress, is therefore included. Empty when
    /// unconfigured.
    pub fn predict_stop_weeks(&self, count: usize, today: NaiveDate) -> Vec<StopWeekInterval> {
        let cfg = match &self.config {
            Some(cfg) => cfg,
            None => return Vec::new(),
        };

        let length = i64::from(cfg.cycle_length);
        let elapsed = (today - cfg.start_date).num_days();
        let mut cycle_index = elapsed.div_euclid(length);

        let mut intervals = Vec::with_capacity(count);
        while intervals.len() < count {
            let cycle_base = cfg.start_date + Duration::days(cycle_index * length);
            let start = cycle_base + Duration::days(i64::from(cfg.stop_week_start) - 1);
            let end = cycle_base + Duration::days(i64::from(cfg.stop_week_end) - 1);
            if end >= today {
                intervals.push(StopWeekInterval { start, end });
            }
            cycle_index += 1;
        }
        intervals
    }

    /// Slide the cycle start by `delta_days` (negative allowed).
    ///
    /// This is the "forgotten pill" correction: the whole future schedule
    /// moves with it. Returns false (and does nothing) when unconfigured.
    pub fn shift_start(&mut self, delta_days: i64) -> bool {
        match &mut self.config {
            Some(cfg) => {
                cfg.start_date += Duration::days(delta_days);
                true
            }
            None => false,
        }
    }
}

/// Recorded flow per calendar day within the given month.
///
/// Only entries carrying a flow label count. When a day has several, the
/// one with the latest timestamp wins; an exact timestamp tie resolves to
/// the later entry in input order.
pub fn flow_history(
    entries: &[MoodEntry],
    year: i32,
    month: u32,
) -> BTreeMap<NaiveDate, FlowLevel> {
    let mut latest: BTreeMap<NaiveDate, (chrono::DateTime<chrono::Utc>, FlowLevel)> =
        BTreeMap::new();

    for entry in entries {
        let flow = match entry.flow {
            Some(flow) => flow,
            None => continue,
        };
        let date = entry.timestamp.date_naive();
        if date.year() != year || date.month() != month {
            continue;
        }
        match latest.get(&date) {
            Some((seen, _)) if entry.timestamp < *seen => {}
            _ => {
                latest.insert(date, (entry.timestamp, flow));
            }
        }
    }

    latest
        .into_iter()
        .map(|(date, (_, flow))| (date, flow))
        .collect()
}

/// Mean ordinal flow intensity (spotting=1 .. heavy=4) over entries whose
/// calendar day falls in `[from, to]`. `FlowLevel::None` is excluded;
/// returns `None` when nothing matches.
pub fn average_flow_intensity(
    entries: &[MoodEntry],
    from: NaiveDate,
    to: NaiveDate,
) -> Option<f64> {
    let intensities: Vec<f64> = entries
        .iter()
        .filter(|e| {
            let date = e.timestamp.date_naive();
            date >= from && date <= to
        })
        .filter_map(|e| e.flow.and_then(|f| f.intensity()))
        .collect();

    if intensities.is_empty() {
        return None;
    }
    Some(intensities.iter().sum::<f64>() / intensities.len() as f64)
}

fn validate(config: &CycleConfiguration) -> Result<(), EngineError> {
    if config.cycle_length < 2 {
        return Err(EngineError::InvalidConfiguration(format!(
            "cycle length {} is too short",
            config.cycle_length
        )));
    }
    if config.stop_week_start < 1
        || config.stop_week_start >= config.stop_week_end
        || config.stop_week_end > config.cycle_length
    {
        return Err(EngineError::InvalidConfiguration(format!(
            "stop week {}..{} does not fit a {}-day cycle",
            config.stop_week_start, config.stop_week_end, config.cycle_length
        )));
    }
    Ok(())
}

/// 1-indexed day in the cycle for `date` under `cfg`.
///
/// `rem_euclid` keeps the result non-negative, so dates before the cycle
/// start map onto a valid day of the previous cycle.
pub fn day_in_cycle(cfg: &CycleConfiguration, date: NaiveDate) -> u32 {
    let length = i64::from(cfg.cycle_length);
    let elapsed = (date - cfg.start_date).num_days();
    (elapsed.rem_euclid(length) + 1) as u32
}

/// Classify a 1-indexed cycle day.
///
/// The PMS window is the `PMS_WINDOW_DAYS` days immediately before the
/// stop week. The window start is deliberately not re-normalized into
/// 1..=cycle_length, so a configuration with `stop_week_start <= 7` gets a
/// window truncated at day 1 instead of one wrapping past the cycle end.
fn phase_for_day(cfg: &CycleConfiguration, day: u32) -> CyclePhase {
    if day >= cfg.stop_week_start && day <= cfg.stop_week_end {
        return CyclePhase::StopWeek;
    }
    let pms_start = i64::from(cfg.stop_week_start) - i64::from(PMS_WINDOW_DAYS);
    let day = i64::from(day);
    if day >= pms_start && day < i64::from(cfg.stop_week_start) {
        return CyclePhase::Pms;
    }
    CyclePhase::Active
}

fn days_until_stop_week(cfg: &CycleConfiguration, day: u32) -> i64 {
    if day >= cfg.stop_week_start && day <= cfg.stop_week_end {
        return 0;
    }
    if day < cfg.stop_week_start {
        i64::from(cfg.stop_week_start - day)
    } else {
        i64::from(cfg.cycle_length - day + cfg.stop_week_start)
    }
}
