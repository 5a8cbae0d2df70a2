//! Tag correlation heuristic
//!
//! For every distinct tag, compares the average mood of entries carrying
//! it against the overall average, normalized by the score half-range and
//! clamped to [-1, 1]. Deliberately crude: no significance testing, no
//! sample-size correction. Downstream display thresholds (0.3 reads as
//! "strong") are calibrated against exactly this formula, so it must not
//! be swapped for a rigorous coefficient.

use std::collections::BTreeMap;

use crate::types::{MoodEntry, TagCorrelation, MAX_MOOD_SCORE};

/// Per-tag mood correlation over the full entry snapshot.
///
/// Output holds one row per distinct tag, sorted by descending
/// |correlation| with ties broken by tag name. A tag repeated within one
/// entry counts once. Empty input yields an empty vec.
pub fn tag_correlations(entries: &[MoodEntry]) -> Vec<TagCorrelation> {
    if entries.is_empty() {
        return Vec::new();
    }

    let overall_average =
        entries.iter().map(|e| e.score).sum::<f64>() / entries.len() as f64;

    let mut per_tag: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for entry in entries {
        let mut seen: Vec<&str> = Vec::new();
        for tag in &entry.tags {
            let tag = tag.as_str();
            if seen.contains(&tag) {
                continue;
            }
            seen.push(tag);
            let slot = per_tag.entry(tag).or_insert((0.0, 0));
            slot.0 += entry.score;
            slot.1 += 1;
        }
    }

    let mut rows: Vec<TagCorrelation> = per_tag
        .into_iter()
        .map(|(tag, (sum, occurrences))| {
            let average_mood = sum / occurrences as f64;
            let correlation =
                ((average_mood - overall_average) / MAX_MOOD_SCORE).clamp(-1.0, 1.0);
            TagCorrelation {
                tag: tag.to_string(),
                average_mood,
                occurrences,
                correlation,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.correlation
            .abs()
            .partial_cmp(&a.correlation.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.tag.cmp(&b.tag))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn entry(score: f64, tags: &[&str]) -> MoodEntry {
        MoodEntry::new(Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap(), score)
            .with_tags(tags.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn correlation_is_normalized_deviation_from_overall_average() {
        let entries = vec![
            entry(2.0, &["A"]),
            entry(-2.0, &["B"]),
            entry(0.0, &[]),
        ];
        let rows = tag_correlations(&entries);
        assert_eq!(rows.len(), 2);

        let a = rows.iter().find(|r| r.tag == "A").unwrap();
        assert_eq!(a.average_mood, 2.0);
        assert_eq!(a.occurrences, 1);
        assert_eq!(a.correlation, 0.4);

        let b = rows.iter().find(|r| r.tag == "B").unwrap();
        assert_eq!(b.correlation, -0.4);
    }

    #[test]
    fn overall_average_includes_untagged_entries() {
        // Overall average is 2.0, so "up" deviates by +2 -> 0.4
        let entries = vec![entry(4.0, &["up"]), entry(0.0, &[])];
        let rows = tag_correlations(&entries);
        assert_eq!(rows[0].correlation, 0.4);
    }

    #[test]
    fn sorted_by_correlation_strength_regardless_of_sign() {
        let entries = vec![
            entry(1.0, &["weak"]),
            entry(-4.0, &["strong-negative"]),
            entry(3.0, &[]),
        ];
        let rows = tag_correlations(&entries);
        assert_eq!(rows[0].tag, "strong-negative");
        assert!(rows[0].correlation < 0.0);
        assert_eq!(rows[1].tag, "weak");
    }

    #[test]
    fn duplicate_tag_within_one_entry_counts_once() {
        let entries = vec![entry(3.0, &["gym", "gym"]), entry(-3.0, &[])];
        let rows = tag_correlations(&entries);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].occurrences, 1);
        assert_eq!(rows[0].average_mood, 3.0);
    }

    #[test]
    fn correlation_clamped_for_tiny_samples() {
        // One euphoric tagged entry against a miserable population
        let entries = vec![
            entry(5.0, &["party"]),
            entry(-5.0, &[]),
            entry(-5.0, &[]),
            entry(-5.0, &[]),
        ];
        let rows = tag_correlations(&entries);
        assert_eq!(rows[0].correlation, 1.0);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(tag_correlations(&[]).is_empty());
    }

    #[test]
    fn one_row_per_distinct_tag() {
        let entries = vec![
            entry(1.0, &["a", "b"]),
            entry(2.0, &["b", "c"]),
            entry(3.0, &["c"]),
        ];
        let rows = tag_correlations(&entries);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn ties_break_by_tag_name() {
        let entries = vec![entry(2.0, &["b", "a"]), entry(-2.0, &[])];
        let rows = tag_correlations(&entries);
        assert_eq!(rows[0].tag, "a");
        assert_eq!(rows[1].tag, "b");
    }
}
