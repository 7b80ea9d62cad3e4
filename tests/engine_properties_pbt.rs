//! Property-based tests for the analytics engine
//!
//! Invariants covered:
//! - Determinism: identical inputs give identical daily forecasts
//! - Stage-respecting simulation: every step follows the policy
//! - Bucket conservation: bucketed reviews equal simulated reviews, for a
//!   bare simulator and for the whole forecaster
//! - Outlier idempotence: re-analysing the included set changes nothing
//! - Scenario ordering: fast-track <= expected <= conservative
//! - Accuracy type exclusivity: radical reading tallies never count

mod common;

use chrono::{Duration, Offset, Utc};
use proptest::prelude::*;

use srs_insight::accuracy::accuracy_metrics;
use srs_insight::config::{ForecastConfig, LeechThresholds, PaceConfig};
use srs_insight::forecast::{forecast_workload, DayBuckets, ReviewOrigin, TrajectorySimulator, TrajectoryStart};
use srs_insight::leech::detect_leeches;
use srs_insight::pace::{analyze_pace, level_durations, project_completion};
use srs_insight::random::SeededRandom;
use srs_insight::srs::{SrsLadder, SrsPolicy};
use srs_insight::types::{Assignment, ReviewStatistic, SrsStage, Subject, SubjectType};

use common::{assignment, level_history, now, statistic, subject};

// ============================================================================
// Generators
// ============================================================================

fn arb_probability() -> impl Strategy<Value = f64> {
    (0u32..=100).prop_map(|v| v as f64 / 100.0)
}

fn arb_active_stage() -> impl Strategy<Value = SrsStage> {
    (1u8..=8).prop_map(SrsStage::new)
}

fn arb_queue() -> impl Strategy<Value = Vec<(u8, i64)>> {
    // (stage, hours from now until due; negative is overdue)
    prop::collection::vec((1u8..=8, -72i64..=720), 0..40)
}

fn arb_level_days() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((10u32..=900).prop_map(|v| v as f64 / 10.0), 0..25)
}

fn build_queue(queue: &[(u8, i64)]) -> (Vec<Subject>, Vec<Assignment>) {
    let subjects: Vec<Subject> = (0..queue.len())
        .map(|i| subject(i as u64 + 1, 1, SubjectType::Kanji))
        .collect();
    let assignments = subjects
        .iter()
        .zip(queue)
        .map(|(s, &(stage, hours))| assignment(s, SrsStage::new(stage), Some(now() + Duration::hours(hours))))
        .collect();
    (subjects, assignments)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn forecast_is_deterministic(
        queue in arb_queue(),
        lessons_per_day in 0u32..=20,
        horizon_days in 1u32..=45,
    ) {
        let (_, assignments) = build_queue(&queue);
        let config = ForecastConfig { lessons_per_day, horizon_days, ..Default::default() };
        let ladder = SrsLadder::standard();

        let a = forecast_workload(&assignments, &[], &config, "learner", now(), &ladder);
        let b = forecast_workload(&assignments, &[], &config, "learner", now(), &ladder);

        prop_assert_eq!(a.daily.len(), horizon_days as usize);
        prop_assert_eq!(&a.daily, &b.daily);
        let total: u64 = a.daily.iter().map(|d| d.total as u64).sum();
        prop_assert_eq!(total, a.metrics.total_reviews);
        // overdue queue items and lessons up to the final day all conserve
        prop_assert_eq!(a.simulated_reviews, total);
        prop_assert_eq!(a.simulated_reviews, b.simulated_reviews);
        prop_assert_eq!(a.lessons_simulated, lessons_per_day * horizon_days);
    }

    #[test]
    fn simulation_follows_policy_and_conserves_buckets(
        starts in prop::collection::vec((arb_active_stage(), 0i64..=500, arb_probability()), 1..30),
        seed in any::<u64>(),
    ) {
        let ladder = SrsLadder::standard();
        let simulator = TrajectorySimulator::new(&ladder, now() + Duration::days(60), Utc.fix());
        let mut rng = SeededRandom::from_seed(seed);
        let mut buckets = DayBuckets::new();
        let mut simulated = 0u32;

        for (stage, hours, p) in starts {
            let trajectory = simulator.simulate(
                TrajectoryStart {
                    at: now() + Duration::hours(hours),
                    stage,
                    success_probability: p,
                    origin: ReviewOrigin::Existing,
                },
                &mut buckets,
                &mut rng,
            );
            prop_assert!(trajectory.stages.iter().all(|s| ladder.is_active(*s)));
            if let Some(first) = trajectory.stages.first() {
                prop_assert_eq!(*first, stage);
            }
            for pair in trajectory.stages.windows(2) {
                let up = ladder.next_stage_on_correct(pair[0]);
                let down = ladder.next_stage_on_incorrect(pair[0]);
                prop_assert!(pair[1] == up || pair[1] == down);
            }
            simulated += trajectory.reviews;
        }

        let bucketed: u32 = buckets.values().map(|b| b.total()).sum();
        prop_assert_eq!(bucketed, simulated);
    }

    #[test]
    fn outlier_exclusion_is_idempotent(days in arb_level_days()) {
        let durations = level_durations(&level_history(&days));
        let first = analyze_pace(&durations, &PaceConfig::default());

        let kept: Vec<_> = first.included.iter().map(|c| c.duration.clone()).collect();
        let config = PaceConfig { auto_exclude_outliers: false, ..Default::default() };
        let second = analyze_pace(&kept, &config);

        prop_assert_eq!(second.stats.included_count, first.stats.included_count);
        prop_assert!((second.stats.average - first.stats.average).abs() < 1e-9);
        prop_assert!((second.stats.std_dev - first.stats.std_dev).abs() < 1e-9);
        if !durations.is_empty() {
            prop_assert!(!first.included.is_empty());
        }
    }

    #[test]
    fn scenarios_are_ordered(days in arb_level_days(), current in 1u8..=59) {
        let p = project_completion(current, &level_history(&days), &PaceConfig::default(), now());
        prop_assert!(p.fast_track.completion_date <= p.expected.completion_date);
        prop_assert!(p.expected.completion_date <= p.conservative.completion_date);
    }

    #[test]
    fn radical_reading_never_counts(
        meaning in (0u32..50, 0u32..50),
        reading in (0u32..50, 0u32..50),
    ) {
        let radical = subject(1, 1, SubjectType::Radical);
        let stat = ReviewStatistic {
            reading_correct: reading.0,
            reading_incorrect: reading.1,
            ..statistic(&radical, meaning.0, meaning.1)
        };
        let m = accuracy_metrics(&[stat], &[radical]);
        prop_assert_eq!(m.total_answers, (meaning.0 + meaning.1) as u64);
        prop_assert_eq!(m.reading, 0.0);
        prop_assert_eq!(m.by_type.radical.reading, None);
    }

    #[test]
    fn leech_boundary_is_inclusive(min_reviews in 1u32..=40, correct_share in 0u32..=100) {
        // exactly min_reviews answers at some accuracy; threshold set to that accuracy
        let kanji = subject(1, 1, SubjectType::Kanji);
        let correct = min_reviews * correct_share / 100;
        let stat = statistic(&kanji, correct, min_reviews - correct);
        let accuracy = correct as f64 * 100.0 / min_reviews as f64;
        let assignments = vec![assignment(&kanji, SrsStage::APPRENTICE_2, None)];
        let subjects = vec![kanji];

        let at = LeechThresholds { min_reviews, max_accuracy: accuracy, include_burned: false };
        prop_assert_eq!(detect_leeches(&[stat.clone()], &subjects, &assignments, &at).len(), 1);

        let more_reviews = LeechThresholds { min_reviews: min_reviews + 1, ..at.clone() };
        prop_assert!(detect_leeches(&[stat.clone()], &subjects, &assignments, &more_reviews).is_empty());

        if accuracy >= 1.0 {
            let stricter = LeechThresholds { max_accuracy: accuracy - 1.0, ..at };
            prop_assert!(detect_leeches(&[stat], &subjects, &assignments, &stricter).is_empty());
        }
    }
}
