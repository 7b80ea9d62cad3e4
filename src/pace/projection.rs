//! Level-60 completion projection
//!
//! Three scenarios are projected from the robust pace:
//!
//! - expected: trimmed mean or median days per level
//! - fast-track: the fastest pace the curriculum allows
//! - conservative: 1.5× the expected pace, with a floor

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::{AveragingMethod, PaceConfig};
use crate::numeric::round_to;
use crate::types::{LevelProgression, MAX_LEVEL};

use super::stats::{analyze_pace, level_durations, ClassifiedLevel, PaceAnalysis};

/// Fastest sustainable pace, independent of history
pub const FAST_TRACK_DAYS_PER_LEVEL: f64 = 7.0;
pub const CONSERVATIVE_FACTOR: f64 = 1.5;
pub const MIN_CONSERVATIVE_DAYS_PER_LEVEL: f64 = 10.0;

/// Used when the learner has no completed levels yet
pub const DEFAULT_EXPECTED_DAYS_PER_LEVEL: f64 = 12.0;
pub const DEFAULT_FAST_TRACK_DAYS_PER_LEVEL: f64 = 8.0;
pub const DEFAULT_CONSERVATIVE_DAYS_PER_LEVEL: f64 = 18.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProjection {
    pub days_per_level: f64,
    pub total_days: f64,
    pub completion_date: DateTime<Utc>,
}

impl ScenarioProjection {
    fn new(days_per_level: f64, remaining_levels: u8, now: DateTime<Utc>) -> Self {
        let total_days = days_per_level * remaining_levels as f64;
        let seconds = (total_days * 86_400.0).round() as i64;
        // past chrono's range the date pins to the latest representable instant
        let completion_date = Duration::try_seconds(seconds)
            .and_then(|offset| now.checked_add_signed(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            days_per_level: round_to(days_per_level, 2),
            total_days: round_to(total_days, 1),
            completion_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProjection {
    pub current_level: u8,
    pub remaining_levels: u8,
    pub already_complete: bool,
    /// No completed levels; scenario paces are fixed defaults
    pub used_defaults: bool,
    pub method: AveragingMethod,
    pub expected: ScenarioProjection,
    pub fast_track: ScenarioProjection,
    pub conservative: ScenarioProjection,
    pub fastest_level: Option<ClassifiedLevel>,
    pub slowest_level: Option<ClassifiedLevel>,
    pub pace: PaceAnalysis,
}

pub fn project_completion(
    current_level: u8,
    progressions: &[LevelProgression],
    config: &PaceConfig,
    now: DateTime<Utc>,
) -> LevelProjection {
    let durations = level_durations(progressions);
    let pace = analyze_pace(&durations, config);
    let remaining_levels = MAX_LEVEL.saturating_sub(current_level);

    if current_level >= MAX_LEVEL {
        let done = ScenarioProjection::new(0.0, 0, now);
        return LevelProjection {
            current_level,
            remaining_levels: 0,
            already_complete: true,
            used_defaults: false,
            method: config.averaging,
            expected: done.clone(),
            fast_track: done.clone(),
            conservative: done,
            fastest_level: pace.fastest().cloned(),
            slowest_level: pace.slowest().cloned(),
            pace,
        };
    }

    let used_defaults = pace.included.is_empty();
    let (expected, fast, conservative) = if used_defaults {
        (
            DEFAULT_EXPECTED_DAYS_PER_LEVEL,
            DEFAULT_FAST_TRACK_DAYS_PER_LEVEL,
            DEFAULT_CONSERVATIVE_DAYS_PER_LEVEL,
        )
    } else {
        let expected = match config.averaging {
            AveragingMethod::TrimmedMean => pace.stats.average,
            AveragingMethod::Median => pace.stats.included_median,
        };
        // a learner already faster than fast-track keeps their own pace
        let fast = FAST_TRACK_DAYS_PER_LEVEL.min(expected);
        let conservative = (expected * CONSERVATIVE_FACTOR).max(MIN_CONSERVATIVE_DAYS_PER_LEVEL);
        (expected, fast, conservative)
    };

    tracing::debug!(
        current_level,
        remaining_levels,
        expected_days_per_level = expected,
        used_defaults,
        "level completion projected"
    );

    LevelProjection {
        current_level,
        remaining_levels,
        already_complete: false,
        used_defaults,
        method: config.averaging,
        expected: ScenarioProjection::new(expected, remaining_levels, now),
        fast_track: ScenarioProjection::new(fast, remaining_levels, now),
        conservative: ScenarioProjection::new(conservative, remaining_levels, now),
        fastest_level: pace.fastest().cloned(),
        slowest_level: pace.slowest().cloned(),
        pace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn history(days: &[i64]) -> Vec<LevelProgression> {
        let mut t = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        days.iter()
            .enumerate()
            .map(|(i, &d)| {
                let unlocked = t;
                t += Duration::days(d);
                LevelProgression {
                    level: i as u8 + 1,
                    unlocked_at: Some(unlocked),
                    passed_at: Some(t),
                    created_at: unlocked,
                }
            })
            .collect()
    }

    #[test]
    fn test_complete_learner() {
        let p = project_completion(60, &history(&[10, 12]), &PaceConfig::default(), now());
        assert!(p.already_complete);
        assert_eq!(p.remaining_levels, 0);
        assert_eq!(p.expected.completion_date, now());
    }

    #[test]
    fn test_no_history_uses_defaults() {
        let p = project_completion(3, &[], &PaceConfig::default(), now());
        assert!(p.used_defaults);
        assert_eq!(p.remaining_levels, 57);
        assert_eq!(p.expected.days_per_level, 12.0);
        assert_eq!(p.fast_track.days_per_level, 8.0);
        assert_eq!(p.conservative.days_per_level, 18.0);
        assert_eq!(p.expected.completion_date, now() + Duration::days(12 * 57));
    }

    #[test]
    fn test_outlier_does_not_stretch_expected_date() {
        let p = project_completion(10, &history(&[10, 11, 12, 9, 40]), &PaceConfig::default(), now());
        assert_eq!(p.expected.days_per_level, 10.5);
        assert_eq!(p.expected.completion_date, now() + Duration::days(525));
        assert_eq!(p.pace.excluded.len(), 1);
        assert_eq!(p.fastest_level.as_ref().unwrap().duration.level, 4);
        assert_eq!(p.slowest_level.as_ref().unwrap().duration.level, 3);
        assert_eq!(p.conservative.days_per_level, 15.75);
    }

    #[test]
    fn test_median_method() {
        let config = PaceConfig {
            averaging: AveragingMethod::Median,
            ..Default::default()
        };
        let p = project_completion(10, &history(&[8, 9, 14, 20, 21]), &config, now());
        assert_eq!(p.expected.days_per_level, 14.0);
    }

    #[test]
    fn test_scenarios_are_ordered_for_fast_learner() {
        let p = project_completion(20, &history(&[5, 6, 5, 6, 5, 6]), &PaceConfig::default(), now());
        assert!(p.fast_track.completion_date <= p.expected.completion_date);
        assert!(p.expected.completion_date <= p.conservative.completion_date);
        assert_eq!(p.conservative.days_per_level, MIN_CONSERVATIVE_DAYS_PER_LEVEL);
    }

    #[test]
    fn test_far_future_pass_date_saturates_completion() {
        // "never" sentinel used by some exports
        let progressions = vec![LevelProgression {
            level: 1,
            unlocked_at: Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
            passed_at: Some(Utc.with_ymd_and_hms(9999, 12, 31, 0, 0, 0).unwrap()),
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        }];
        let p = project_completion(2, &progressions, &PaceConfig::default(), now());

        assert!(!p.used_defaults);
        assert_eq!(p.expected.completion_date, DateTime::<Utc>::MAX_UTC);
        assert_eq!(p.conservative.completion_date, DateTime::<Utc>::MAX_UTC);
        assert_eq!(p.fast_track.days_per_level, FAST_TRACK_DAYS_PER_LEVEL);
        assert_eq!(p.fast_track.completion_date, now() + Duration::days(7 * 58));
        assert!(p.fast_track.completion_date <= p.expected.completion_date);
    }
}
