//! Workload forecast
//!
//! Simulates every item already in the queue plus every lesson the learner
//! is projected to take, then summarizes the per-day review load.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::config::ForecastConfig;
use crate::numeric::{mean, round_to, std_dev};
use crate::random::SeededRandom;
use crate::srs::SrsPolicy;
use crate::types::{AnswerCounts, Assignment, ReviewStatistic};

use super::simulator::{DayBuckets, ReviewOrigin, TrajectorySimulator, TrajectoryStart};

/// Accuracy assumed when the learner has no review history
pub const DEFAULT_ACCURACY: f64 = 0.85;

const STABILIZATION_WINDOW: usize = 7;
const STABILIZATION_MIN_MEAN: f64 = 10.0;
const STABILIZATION_MAX_CV: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub day_index: u32,
    pub date: NaiveDate,
    pub existing_reviews: u32,
    pub new_lesson_reviews: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakDay {
    pub day_index: u32,
    pub date: NaiveDate,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadMetrics {
    pub total_reviews: u64,
    pub average_per_day: u32,
    pub max_per_day: u32,
    pub min_per_day: u32,
    pub peak_day: Option<PeakDay>,
    /// First day whose trailing week is both busy and steady
    pub stabilization_day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeBreakdown {
    pub existing_reviews: u64,
    pub new_lesson_reviews: u64,
    pub existing_percent: f64,
    pub new_lesson_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadForecast {
    pub generated_for: NaiveDate,
    pub seed: u64,
    pub historical_accuracy: f64,
    pub existing_items_simulated: u32,
    pub lessons_simulated: u32,
    /// Reviews produced by every simulated trajectory; equals the daily totals
    pub simulated_reviews: u64,
    pub daily: Vec<DailyForecast>,
    pub metrics: WorkloadMetrics,
    pub breakdown: VolumeBreakdown,
}

/// Share of correct answers across all visible review statistics
pub fn historical_accuracy(review_statistics: &[ReviewStatistic]) -> f64 {
    let mut totals = AnswerCounts::default();
    for stat in review_statistics.iter().filter(|s| !s.hidden) {
        totals.add(&stat.counts());
    }
    if totals.total() == 0 {
        return DEFAULT_ACCURACY;
    }
    totals.correct() as f64 / totals.total() as f64
}

pub fn forecast_workload<P: SrsPolicy + ?Sized>(
    assignments: &[Assignment],
    review_statistics: &[ReviewStatistic],
    config: &ForecastConfig,
    learner_id: &str,
    now: DateTime<Utc>,
    policy: &P,
) -> WorkloadForecast {
    let offset = config.utc_offset();
    let today = now.with_timezone(&offset).date_naive();
    let horizon_days = config.horizon_days;
    let horizon_end = start_of_local_day(today + Duration::days(horizon_days as i64), offset);

    let accuracy = historical_accuracy(review_statistics);
    let mut rng = SeededRandom::for_forecast(learner_id, today, config.lessons_per_day);
    let simulator = TrajectorySimulator::new(policy, horizon_end, offset);
    let mut buckets = DayBuckets::new();
    let mut simulated_reviews = 0u64;

    let mut existing_items = 0u32;
    for assignment in assignments {
        if assignment.hidden || !policy.is_active(assignment.srs_stage) {
            continue;
        }
        let Some(available_at) = assignment.available_at else {
            continue;
        };
        if available_at >= horizon_end {
            continue;
        }
        // overdue items are due right now
        let start = TrajectoryStart {
            at: available_at.max(now),
            stage: assignment.srs_stage,
            success_probability: accuracy,
            origin: ReviewOrigin::Existing,
        };
        simulated_reviews += simulator.simulate(start, &mut buckets, &mut rng).reviews as u64;
        existing_items += 1;
    }

    // lessons start tomorrow
    let mut lessons = 0u32;
    for day_offset in 1..=horizon_days {
        let lesson_time = now + Duration::days(day_offset as i64);
        for _ in 0..config.lessons_per_day {
            let start = TrajectoryStart {
                at: lesson_time,
                stage: policy.lesson_stage(),
                success_probability: accuracy,
                origin: ReviewOrigin::NewLesson,
            };
            simulated_reviews += simulator.simulate(start, &mut buckets, &mut rng).reviews as u64;
            lessons += 1;
        }
    }

    let daily = daily_series(&buckets, today, horizon_days);
    let metrics = workload_metrics(&daily);
    let breakdown = volume_breakdown(&daily);

    tracing::debug!(
        learner_id,
        existing_items,
        lessons,
        simulated_reviews,
        total_reviews = metrics.total_reviews,
        "workload forecast complete"
    );

    WorkloadForecast {
        generated_for: today,
        seed: rng.seed(),
        historical_accuracy: accuracy,
        existing_items_simulated: existing_items,
        lessons_simulated: lessons,
        simulated_reviews,
        daily,
        metrics,
        breakdown,
    }
}

/// UTC instant of local midnight for `date`
pub(crate) fn start_of_local_day(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = date.and_time(NaiveTime::MIN);
    let utc = local_midnight - Duration::seconds(offset.local_minus_utc() as i64);
    DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc)
}

fn daily_series(buckets: &DayBuckets, today: NaiveDate, horizon_days: u32) -> Vec<DailyForecast> {
    (0..horizon_days)
        .map(|day_index| {
            let date = today + Duration::days(day_index as i64);
            let bucket = buckets.get(&date).copied().unwrap_or_default();
            DailyForecast {
                day_index,
                date,
                existing_reviews: bucket.existing,
                new_lesson_reviews: bucket.new_lessons,
                total: bucket.total(),
            }
        })
        .collect()
}

pub fn workload_metrics(daily: &[DailyForecast]) -> WorkloadMetrics {
    let total_reviews: u64 = daily.iter().map(|d| d.total as u64).sum();
    let max_per_day = daily.iter().map(|d| d.total).max().unwrap_or(0);
    let min_per_day = daily.iter().map(|d| d.total).min().unwrap_or(0);
    let average_per_day = if daily.is_empty() {
        0
    } else {
        (total_reviews as f64 / daily.len() as f64).round() as u32
    };
    let peak_day = daily
        .iter()
        .find(|d| d.total == max_per_day)
        .map(|d| PeakDay {
            day_index: d.day_index,
            date: d.date,
            total: d.total,
        });

    WorkloadMetrics {
        total_reviews,
        average_per_day,
        max_per_day,
        min_per_day,
        peak_day,
        stabilization_day: stabilization_day(daily),
    }
}

fn stabilization_day(daily: &[DailyForecast]) -> Option<u32> {
    let totals: Vec<f64> = daily.iter().map(|d| d.total as f64).collect();
    (STABILIZATION_WINDOW - 1..totals.len()).find_map(|i| {
        let window = &totals[i + 1 - STABILIZATION_WINDOW..=i];
        let m = mean(window);
        if m >= STABILIZATION_MIN_MEAN && std_dev(window) / m < STABILIZATION_MAX_CV {
            Some(daily[i].day_index)
        } else {
            None
        }
    })
}

fn volume_breakdown(daily: &[DailyForecast]) -> VolumeBreakdown {
    let existing: u64 = daily.iter().map(|d| d.existing_reviews as u64).sum();
    let new_lessons: u64 = daily.iter().map(|d| d.new_lesson_reviews as u64).sum();
    let total = existing + new_lessons;
    let share = |part: u64| {
        if total == 0 {
            0.0
        } else {
            round_to(part as f64 * 100.0 / total as f64, 1)
        }
    };
    VolumeBreakdown {
        existing_reviews: existing,
        new_lesson_reviews: new_lessons,
        existing_percent: share(existing),
        new_lesson_percent: share(new_lessons),
    }
}
