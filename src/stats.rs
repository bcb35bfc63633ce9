use crate::models::{DayRecord, DayStatus, StatsResponse, TrackingData};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Canonical `YYYY-MM-DD` key for a calendar date. Keys are zero-padded,
/// so lexicographic order on keys equals chronological order.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's calendar date in the local timezone. Canonical keys derive from
/// local time; going through a UTC conversion can land on the wrong day
/// near midnight.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Strict parse of a canonical key. Rejects anything that does not
/// round-trip back to the same string (e.g. `2025-5-1`).
pub fn parse_key(key: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
    (date_key(date) == key).then_some(date)
}

/// Aggregate counters, rates, and current streaks over every entry whose
/// key is on or after `cutoff`. Total over its input: malformed keys only
/// degrade individual counters, they never fail the whole computation.
pub fn build_stats(data: &TrackingData, cutoff: &str) -> StatsResponse {
    let tracked: Vec<(&str, &DayRecord)> = data
        .days
        .iter()
        .filter(|(key, _)| key.as_str() >= cutoff)
        .map(|(key, record)| (key.as_str(), record))
        .collect();

    let total_days = tracked.len() as u32;
    let total_days_excluding_sundays = tracked
        .iter()
        .filter(|(key, _)| !matches!(parse_key(key), Some(d) if d.weekday() == Weekday::Sun))
        .count() as u32;
    let gym_days = tracked.iter().filter(|(_, r)| r.gym_completed).count() as u32;
    let diet_days = tracked.iter().filter(|(_, r)| r.diet_maintained).count() as u32;
    let perfect_days = tracked
        .iter()
        .filter(|(_, r)| r.gym_completed && r.diet_maintained)
        .count() as u32;
    let gym_only_days = tracked
        .iter()
        .filter(|(_, r)| r.gym_completed && !r.diet_maintained)
        .count() as u32;

    // BTreeMap iteration is ascending, so reversing gives most-recent-first.
    let mut descending = tracked;
    descending.reverse();

    StatsResponse {
        total_days,
        total_days_excluding_sundays,
        gym_days,
        diet_days,
        perfect_days,
        gym_only_days,
        gym_success_rate: rate(gym_days, total_days),
        diet_success_rate: rate(diet_days, total_days),
        perfect_day_rate: rate(perfect_days, total_days),
        current_gym_streak: current_streak(&descending, |r| r.gym_completed),
        current_diet_streak: current_streak(&descending, |r| r.diet_maintained),
        current_perfect_streak: current_streak(&descending, |r| {
            r.gym_completed && r.diet_maintained
        }),
    }
}

fn rate(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(total) * 100.0).round() as u32
}

/// Count of consecutive most-recent days satisfying `holds`, walking the
/// descending key sequence. A day that fails the predicate is a hard break,
/// and so is a missing calendar day: each step must be exactly one day
/// earlier than the last, so a streak never spans a gap.
fn current_streak(descending: &[(&str, &DayRecord)], holds: impl Fn(&DayRecord) -> bool) -> u32 {
    let mut streak = 0;
    let mut expected: Option<NaiveDate> = None;

    for (key, record) in descending {
        let Some(date) = parse_key(key) else { break };
        if let Some(want) = expected {
            if date != want {
                break;
            }
        }
        if !holds(record) {
            break;
        }
        streak += 1;
        expected = Some(date - Duration::days(1));
    }

    streak
}

/// Presentation category for one calendar day. Looks at the full map, not
/// the cutoff-filtered view, so dates before the cutoff keep their coloring
/// even though they no longer contribute to the statistics.
pub fn classify(data: &TrackingData, date: NaiveDate) -> DayStatus {
    match data.days.get(&date_key(date)) {
        None => DayStatus::Untracked,
        Some(record) => match (record.gym_completed, record.diet_maintained) {
            (true, true) => DayStatus::Perfect,
            (true, false) => DayStatus::GymOnly,
            (false, true) => DayStatus::DietOnly,
            (false, false) => DayStatus::Skipped,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(gym: bool, diet: bool) -> DayRecord {
        DayRecord {
            gym_completed: gym,
            diet_maintained: diet,
            gym_notes: None,
            diet_notes: None,
        }
    }

    fn data(entries: &[(&str, bool, bool)]) -> TrackingData {
        let mut data = TrackingData::default();
        for (key, gym, diet) in entries {
            data.days.insert((*key).to_string(), record(*gym, *diet));
        }
        data
    }

    #[test]
    fn four_day_scenario_counts_and_rates() {
        let data = data(&[
            ("2025-05-20", true, true),
            ("2025-05-21", true, false),
            ("2025-05-22", false, true),
            ("2025-05-23", false, false),
        ]);

        let stats = build_stats(&data, "2025-05-01");
        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.gym_days, 2);
        assert_eq!(stats.diet_days, 2);
        assert_eq!(stats.perfect_days, 1);
        assert_eq!(stats.gym_only_days, 1);
        assert_eq!(stats.gym_success_rate, 50);
        assert_eq!(stats.diet_success_rate, 50);
        assert_eq!(stats.perfect_day_rate, 25);
        assert_eq!(stats.current_gym_streak, 0);
        assert_eq!(stats.current_perfect_streak, 0);
    }

    #[test]
    fn empty_mapping_has_zero_rates() {
        let stats = build_stats(&TrackingData::default(), "2025-01-01");
        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.gym_success_rate, 0);
        assert_eq!(stats.diet_success_rate, 0);
        assert_eq!(stats.perfect_day_rate, 0);
    }

    #[test]
    fn perfect_days_never_exceed_either_habit() {
        let data = data(&[
            ("2025-05-01", true, true),
            ("2025-05-02", true, false),
            ("2025-05-03", false, true),
            ("2025-05-04", true, true),
        ]);
        let stats = build_stats(&data, "2025-01-01");
        assert!(stats.perfect_days <= stats.gym_days.min(stats.diet_days));
    }

    #[test]
    fn cutoff_filter_is_inclusive() {
        let data = data(&[
            ("2025-05-19", true, true),
            ("2025-05-20", true, true),
            ("2025-05-21", true, true),
        ]);
        let stats = build_stats(&data, "2025-05-20");
        assert_eq!(stats.total_days, 2);
    }

    #[test]
    fn sundays_are_excluded_from_secondary_total() {
        // 2025-05-25 is a Sunday, its neighbors are not.
        let data = data(&[
            ("2025-05-24", true, true),
            ("2025-05-25", true, true),
            ("2025-05-26", true, true),
        ]);
        let stats = build_stats(&data, "2025-05-01");
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.total_days_excluding_sundays, 2);
    }

    #[test]
    fn streak_counts_consecutive_recent_days() {
        let data = data(&[
            ("2025-05-20", false, true),
            ("2025-05-21", true, true),
            ("2025-05-22", true, false),
            ("2025-05-23", true, true),
        ]);
        let stats = build_stats(&data, "2025-05-01");
        assert_eq!(stats.current_gym_streak, 3);
        assert_eq!(stats.current_diet_streak, 1);
        assert_eq!(stats.current_perfect_streak, 1);
    }

    #[test]
    fn streak_is_zero_when_most_recent_day_fails() {
        let data = data(&[("2025-05-22", true, true), ("2025-05-23", false, true)]);
        let stats = build_stats(&data, "2025-05-01");
        assert_eq!(stats.current_gym_streak, 0);
        assert_eq!(stats.current_diet_streak, 2);
    }

    #[test]
    fn streak_breaks_on_missing_day() {
        // 2025-05-21 is untracked: the gap ends the streak even though
        // 05-20 would otherwise qualify.
        let data = data(&[
            ("2025-05-20", true, true),
            ("2025-05-22", true, true),
            ("2025-05-23", true, true),
        ]);
        let stats = build_stats(&data, "2025-05-01");
        assert_eq!(stats.current_gym_streak, 2);
        assert_eq!(stats.current_perfect_streak, 2);
    }

    #[test]
    fn classification_covers_all_five_categories() {
        let data = data(&[
            ("2025-05-20", true, true),
            ("2025-05-21", true, false),
            ("2025-05-22", false, true),
            ("2025-05-23", false, false),
        ]);
        let day = |d| NaiveDate::from_ymd_opt(2025, 5, d).unwrap();
        assert_eq!(classify(&data, day(20)), DayStatus::Perfect);
        assert_eq!(classify(&data, day(21)), DayStatus::GymOnly);
        assert_eq!(classify(&data, day(22)), DayStatus::DietOnly);
        assert_eq!(classify(&data, day(23)), DayStatus::Skipped);
        assert_eq!(classify(&data, day(24)), DayStatus::Untracked);
    }

    #[test]
    fn classification_ignores_cutoff() {
        let data = data(&[("2025-04-15", true, true)]);
        let stats = build_stats(&data, "2025-05-01");
        assert_eq!(stats.total_days, 0);
        let date = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        assert_eq!(classify(&data, date), DayStatus::Perfect);
    }

    #[test]
    fn parse_key_rejects_non_canonical_forms() {
        assert!(parse_key("2025-05-01").is_some());
        assert!(parse_key("2025-5-1").is_none());
        assert!(parse_key("2025-05-01T00:00:00").is_none());
        assert!(parse_key("not-a-date").is_none());
    }

    #[test]
    fn malformed_key_degrades_without_failing() {
        let mut data = data(&[("2025-05-23", true, true)]);
        data.days.insert("zzzz-bad-key".to_string(), record(true, true));
        let stats = build_stats(&data, "2025-01-01");
        assert_eq!(stats.total_days, 2);
        // The malformed key sorts last and cannot anchor a streak.
        assert_eq!(stats.current_gym_streak, 0);
    }
}
