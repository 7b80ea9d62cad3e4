//! Per-item review trajectory simulation
//!
//! One item is walked through the SRS policy from a start time until it
//! leaves the active stages, the forecast horizon ends, or the step cap is
//! hit. Each review lands in the bucket of the local calendar day it falls
//! on; several short-interval reviews on one day all count toward that day.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::random::RandomSource;
use crate::srs::SrsPolicy;
use crate::types::SrsStage;

/// Upper bound on simulated reviews per item. Guards against a degenerate
/// transition table; real trajectories within a horizon are far shorter.
pub const MAX_SIMULATION_STEPS: u32 = 100;

/// Review counts for one calendar day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub existing: u32,
    pub new_lessons: u32,
}

impl DayBucket {
    pub fn total(&self) -> u32 {
        self.existing + self.new_lessons
    }
}

pub type DayBuckets = BTreeMap<NaiveDate, DayBucket>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOrigin {
    /// Item already in the learner's queue
    Existing,
    /// Lesson the learner is projected to take
    NewLesson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryEnd {
    HorizonReached,
    Inactive,
    ZeroInterval,
    StepCap,
}

/// Starting point for one item
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryStart {
    pub at: DateTime<Utc>,
    pub stage: SrsStage,
    /// Probability that a review is answered correctly, 0-1
    pub success_probability: f64,
    pub origin: ReviewOrigin,
}

#[derive(Debug, Clone)]
pub struct Trajectory {
    /// Reviews recorded into buckets
    pub reviews: u32,
    /// Stage held at each recorded review, in order
    pub stages: Vec<SrsStage>,
    pub final_stage: SrsStage,
    pub end: TrajectoryEnd,
}

pub struct TrajectorySimulator<'p, P: SrsPolicy + ?Sized> {
    policy: &'p P,
    horizon_end: DateTime<Utc>,
    offset: FixedOffset,
}

impl<'p, P: SrsPolicy + ?Sized> TrajectorySimulator<'p, P> {
    pub fn new(policy: &'p P, horizon_end: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            policy,
            horizon_end,
            offset,
        }
    }

    pub fn simulate<R: RandomSource + ?Sized>(
        &self,
        start: TrajectoryStart,
        buckets: &mut DayBuckets,
        rng: &mut R,
    ) -> Trajectory {
        let mut time = start.at;
        let mut stage = start.stage;
        let mut stages = Vec::new();

        let end = loop {
            if time >= self.horizon_end {
                break TrajectoryEnd::HorizonReached;
            }
            if !self.policy.is_active(stage) {
                break TrajectoryEnd::Inactive;
            }
            if stages.len() as u32 >= MAX_SIMULATION_STEPS {
                break TrajectoryEnd::StepCap;
            }

            let day = time.with_timezone(&self.offset).date_naive();
            let bucket = buckets.entry(day).or_default();
            match start.origin {
                ReviewOrigin::Existing => bucket.existing += 1,
                ReviewOrigin::NewLesson => bucket.new_lessons += 1,
            }
            stages.push(stage);

            stage = if rng.next_f64() < start.success_probability {
                self.policy.next_stage_on_correct(stage)
            } else {
                self.policy.next_stage_on_incorrect(stage)
            };

            if !self.policy.is_active(stage) {
                break TrajectoryEnd::Inactive;
            }

            let hours = self.policy.next_interval_hours(stage);
            if hours == 0 {
                tracing::warn!(stage = stage.value(), "srs policy returned a zero interval");
                break TrajectoryEnd::ZeroInterval;
            }
            match time.checked_add_signed(Duration::hours(hours as i64)) {
                Some(next) => time = next,
                None => break TrajectoryEnd::HorizonReached,
            }
        };

        Trajectory {
            reviews: stages.len() as u32,
            stages,
            final_stage: stage,
            end,
        }
    }
}
