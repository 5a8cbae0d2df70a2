//! Series aggregation
//!
//! Buckets an entry snapshot along different axes for charting:
//! - calendar day (trailing window, sparse: empty days are omitted)
//! - day in cycle (dense: exactly one point per cycle day)
//! - weekday (dense, Monday first)
//! - time of day (dense, four fixed bins)
//! - integer score histogram (dense, 11 buckets)
//!
//! All functions are pure; the dense series zero-fill missing buckets
//! because their domains are fixed and small, the daily series does not.

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use std::collections::BTreeMap;

use crate::cycle::day_in_cycle;
use crate::types::{
    CycleConfiguration, CycleDayPoint, DailyPoint, MoodBucket, MoodEntry, TimeOfDay,
    TimeOfDayPoint, WeekdayPoint,
};

/// Weekday labels, Monday first
const WEEKDAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Per-day averages over the trailing `days`-day window ending `today`
/// (inclusive). Days without entries produce no point; each point carries
/// the union of that day's tags in order of first appearance.
pub fn daily_series(entries: &[MoodEntry], today: NaiveDate, days: i64) -> Vec<DailyPoint> {
    let window_start = today - Duration::days(days - 1);

    let mut by_day: BTreeMap<NaiveDate, Vec<&MoodEntry>> = BTreeMap::new();
    for entry in entries {
        let date = entry.timestamp.date_naive();
        if date >= window_start && date <= today {
            by_day.entry(date).or_default().push(entry);
        }
    }

    by_day
        .into_iter()
        .map(|(date, day_entries)| {
            let sum: f64 = day_entries.iter().map(|e| e.score).sum();
            let mut tags: Vec<String> = Vec::new();
            for entry in &day_entries {
                for tag in &entry.tags {
                    if !tags.contains(tag) {
                        tags.push(tag.clone());
                    }
                }
            }
            DailyPoint {
                date,
                average_mood: sum / day_entries.len() as f64,
                entry_count: day_entries.len(),
                tags,
            }
        })
        .collect()
}

/// Per-cycle-day averages over ALL entries (not windowed).
///
/// Emits exactly `cycle_length` points for days 1..=L; days without
/// entries keep an average of 0.0 so charts always span the full cycle.
pub fn cycle_day_series(entries: &[MoodEntry], cfg: &CycleConfiguration) -> Vec<CycleDayPoint> {
    let length = cfg.cycle_length as usize;
    let mut sums = vec![0.0_f64; length];
    let mut counts = vec![0_usize; length];

    for entry in entries {
        let day = day_in_cycle(cfg, entry.timestamp.date_naive());
        let idx = (day - 1) as usize;
        sums[idx] += entry.score;
        counts[idx] += 1;
    }

    (0..length)
        .map(|idx| {
            let day = (idx + 1) as u32;
            CycleDayPoint {
                cycle_day: day,
                average_mood: if counts[idx] > 0 {
                    sums[idx] / counts[idx] as f64
                } else {
                    0.0
                },
                entry_count: counts[idx],
                is_stop_week: day >= cfg.stop_week_start && day <= cfg.stop_week_end,
            }
        })
        .collect()
}

/// Per-weekday averages, exactly 7 points Monday through Sunday,
/// zero-filled where no entries exist.
pub fn weekday_series(entries: &[MoodEntry]) -> Vec<WeekdayPoint> {
    let mut sums = [0.0_f64; 7];
    let mut counts = [0_usize; 7];

    for entry in entries {
        let idx = entry.timestamp.weekday().num_days_from_monday() as usize;
        sums[idx] += entry.score;
        counts[idx] += 1;
    }

    (0..7)
        .map(|idx| WeekdayPoint {
            weekday: WEEKDAY_LABELS[idx].to_string(),
            average_mood: if counts[idx] > 0 {
                sums[idx] / counts[idx] as f64
            } else {
                0.0
            },
            entry_count: counts[idx],
        })
        .collect()
}

/// Averages per time-of-day bin, exactly 4 points in display order,
/// zero-filled where no entries exist.
pub fn time_of_day_series(entries: &[MoodEntry]) -> Vec<TimeOfDayPoint> {
    let mut sums = [0.0_f64; 4];
    let mut counts = [0_usize; 4];

    for entry in entries {
        let idx = match TimeOfDay::from_hour(entry.timestamp.hour()) {
            TimeOfDay::Morning => 0,
            TimeOfDay::Afternoon => 1,
            TimeOfDay::Evening => 2,
            TimeOfDay::Night => 3,
        };
        sums[idx] += entry.score;
        counts[idx] += 1;
    }

    TimeOfDay::ALL
        .iter()
        .enumerate()
        .map(|(idx, period)| TimeOfDayPoint {
            period: *period,
            average_mood: if counts[idx] > 0 {
                sums[idx] / counts[idx] as f64
            } else {
                0.0
            },
            entry_count: counts[idx],
        })
        .collect()
}

/// Histogram over the 11 integer scores -5..=5.
///
/// Scores are rounded half-away-from-zero and clamped into range, so the
/// bucket counts always sum to the number of entries. All 11 buckets are
/// present even when empty.
pub fn mood_distribution(entries: &[MoodEntry]) -> Vec<MoodBucket> {
    let mut counts = [0_usize; 11];
    for entry in entries {
        let rounded = entry.score.round().clamp(-5.0, 5.0) as i32;
        counts[(rounded + 5) as usize] += 1;
    }

    (-5..=5)
        .map(|score| MoodBucket {
            score,
            count: counts[(score + 5) as usize],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(d: u32, hour: u32, score: f64) -> MoodEntry {
        MoodEntry::new(
            Utc.with_ymd_and_hms(2024, 3, d, hour, 0, 0).unwrap(),
            score,
        )
    }

    fn tagged(d: u32, hour: u32, score: f64, tags: &[&str]) -> MoodEntry {
        entry(d, hour, score).with_tags(tags.iter().map(|t| t.to_string()).collect())
    }

    fn config() -> CycleConfiguration {
        CycleConfiguration {
            pill_brand: String::new(),
            cycle_length: 28,
            stop_week_start: 22,
            stop_week_end: 28,
            start_date: date(2024, 3, 1),
        }
    }

    #[test]
    fn daily_series_skips_empty_days() {
        let entries = vec![
            tagged(10, 9, 2.0, &["work"]),
            tagged(10, 18, 4.0, &["sport", "work"]),
            tagged(12, 9, -1.0, &["sleep"]),
        ];
        let series = daily_series(&entries, date(2024, 3, 14), 7);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, date(2024, 3, 10));
        assert_eq!(series[0].average_mood, 3.0);
        assert_eq!(series[0].entry_count, 2);
        assert_eq!(series[0].tags, vec!["work", "sport"]);
        assert_eq!(series[1].date, date(2024, 3, 12));
        assert_eq!(series[1].entry_count, 1);
    }

    #[test]
    fn daily_series_window_is_inclusive_of_today() {
        let entries = vec![entry(8, 9, 1.0), entry(14, 9, 2.0), entry(15, 9, 3.0)];
        // Window 2024-03-08 ..= 2024-03-14: the 15th is tomorrow, out
        let series = daily_series(&entries, date(2024, 3, 14), 7);
        let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 8), date(2024, 3, 14)]);
    }

    #[test]
    fn cycle_day_series_is_dense() {
        let cfg = config();
        let entries = vec![
            entry(1, 9, 2.0),  // cycle day 1
            entry(1, 20, 4.0), // cycle day 1
            entry(22, 9, -3.0), // cycle day 22
        ];
        let series = cycle_day_series(&entries, &cfg);
        assert_eq!(series.len(), 28);
        assert_eq!(series[0].cycle_day, 1);
        assert_eq!(series[0].average_mood, 3.0);
        assert_eq!(series[0].entry_count, 2);
        assert!(!series[0].is_stop_week);
        assert_eq!(series[21].cycle_day, 22);
        assert_eq!(series[21].average_mood, -3.0);
        assert!(series[21].is_stop_week);
        // Unvisited day zero-filled
        assert_eq!(series[9].average_mood, 0.0);
        assert_eq!(series[9].entry_count, 0);
    }

    #[test]
    fn weekday_series_monday_first_zero_filled() {
        // 2024-03-04 is a Monday, 2024-03-10 a Sunday
        let entries = vec![entry(4, 9, 3.0), entry(10, 9, -1.0), entry(11, 9, 1.0)];
        let series = weekday_series(&entries);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].weekday, "Monday");
        assert_eq!(series[0].average_mood, 2.0); // two Mondays: 3.0 and 1.0
        assert_eq!(series[0].entry_count, 2);
        assert_eq!(series[6].weekday, "Sunday");
        assert_eq!(series[6].average_mood, -1.0);
        assert_eq!(series[1].entry_count, 0);
        assert_eq!(series[1].average_mood, 0.0);
    }

    #[test]
    fn time_of_day_series_fixed_order() {
        let entries = vec![
            entry(5, 6, 1.0),  // morning
            entry(5, 13, 2.0), // afternoon
            entry(5, 23, -2.0), // night
            entry(6, 2, -4.0),  // night
        ];
        let series = time_of_day_series(&entries);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].period, TimeOfDay::Morning);
        assert_eq!(series[0].average_mood, 1.0);
        assert_eq!(series[1].period, TimeOfDay::Afternoon);
        assert_eq!(series[2].period, TimeOfDay::Evening);
        assert_eq!(series[2].entry_count, 0);
        assert_eq!(series[3].period, TimeOfDay::Night);
        assert_eq!(series[3].average_mood, -3.0);
    }

    #[test]
    fn mood_distribution_counts_sum_to_entries() {
        let entries = vec![
            entry(5, 9, 4.6),  // rounds to 5
            entry(5, 10, 4.4), // rounds to 4
            entry(5, 11, -0.5), // half away from zero: -1
            entry(5, 12, 0.5),  // half away from zero: 1
            entry(5, 13, 0.0),
        ];
        let dist = mood_distribution(&entries);
        assert_eq!(dist.len(), 11);
        assert_eq!(dist.iter().map(|b| b.count).sum::<usize>(), entries.len());
        let count_of = |score: i32| dist.iter().find(|b| b.score == score).unwrap().count;
        assert_eq!(count_of(5), 1);
        assert_eq!(count_of(4), 1);
        assert_eq!(count_of(-1), 1);
        assert_eq!(count_of(1), 1);
        assert_eq!(count_of(0), 1);
    }

    #[test]
    fn mood_distribution_empty_input_keeps_all_buckets() {
        let dist = mood_distribution(&[]);
        assert_eq!(dist.len(), 11);
        assert!(dist.iter().all(|b| b.count == 0));
        assert_eq!(dist[0].score, -5);
        assert_eq!(dist[10].score, 5);
    }
}
