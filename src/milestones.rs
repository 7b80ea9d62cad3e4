//! Milestone timeline
//!
//! Count milestones fire on the N-th qualifying event in time order. Level
//! milestones fire when the level is unlocked.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{dedupe_level_progressions, Catalog};
use crate::numeric::round_to;
use crate::types::{Assignment, LevelProgression, Subject};

pub const COUNT_TARGETS: [u32; 6] = [1, 100, 500, 1000, 2500, 5000];
pub const LEVEL_TARGETS: [u8; 6] = [10, 20, 30, 40, 50, 60];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Level,
    /// Items that ever reached guru
    Passed,
    Burned,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub kind: MilestoneKind,
    pub target: u32,
    pub label: String,
    pub current: u32,
    pub progress_percent: f64,
    pub achieved_at: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn is_achieved(&self) -> bool {
        self.achieved_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneTimeline {
    /// Oldest first
    pub achieved: Vec<Milestone>,
    /// Closest to completion first
    pub upcoming: Vec<Milestone>,
    pub all_available: u32,
}

impl MilestoneTimeline {
    /// The upcoming milestone closest to completion
    pub fn next(&self) -> Option<&Milestone> {
        self.upcoming.first()
    }
}

/// Count targets below the catalog size, then the catalog size itself
pub fn count_targets(all_available: u32) -> Vec<u32> {
    let mut targets: Vec<u32> = COUNT_TARGETS
        .iter()
        .copied()
        .filter(|&t| t < all_available)
        .collect();
    if all_available > 0 {
        targets.push(all_available);
    }
    targets
}

fn progress(current: u32, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    round_to((current as f64 / target as f64 * 100.0).min(100.0), 1)
}

fn count_milestones(
    kind: MilestoneKind,
    mut events: Vec<DateTime<Utc>>,
    all_available: u32,
) -> Vec<Milestone> {
    events.sort();
    let current = events.len() as u32;
    let noun = match kind {
        MilestoneKind::Burned => "burned",
        _ => "passed",
    };

    count_targets(all_available)
        .into_iter()
        .map(|target| Milestone {
            kind,
            target,
            label: if target == all_available {
                format!("All {target} items {noun}")
            } else {
                format!("{target} items {noun}")
            },
            current,
            progress_percent: progress(current, target),
            achieved_at: events.get(target as usize - 1).copied(),
        })
        .collect()
}

fn level_milestones(progressions: &[LevelProgression], current_level: u8) -> Vec<Milestone> {
    let records = dedupe_level_progressions(progressions);
    LEVEL_TARGETS
        .iter()
        .map(|&level| Milestone {
            kind: MilestoneKind::Level,
            target: level as u32,
            label: format!("Level {level}"),
            current: current_level as u32,
            progress_percent: progress(current_level as u32, level as u32),
            achieved_at: records
                .get(&level)
                .map(|r| r.unlocked_at.unwrap_or(r.created_at)),
        })
        .collect()
}

pub fn track_milestones(
    subjects: &[Subject],
    assignments: &[Assignment],
    progressions: &[LevelProgression],
    current_level: u8,
) -> MilestoneTimeline {
    let catalog = Catalog::new(subjects, assignments);
    let all_available = subjects.iter().filter(|s| !s.removed).count() as u32;

    let counted: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| !a.hidden && catalog.subject(a.subject_id).is_some())
        .collect();
    let passed = counted.iter().filter_map(|a| a.passed_at).collect();
    let burned = counted.iter().filter_map(|a| a.burned_at).collect();

    let mut milestones = level_milestones(progressions, current_level);
    milestones.extend(count_milestones(MilestoneKind::Passed, passed, all_available));
    milestones.extend(count_milestones(MilestoneKind::Burned, burned, all_available));

    let (mut achieved, mut upcoming): (Vec<Milestone>, Vec<Milestone>) =
        milestones.into_iter().partition(Milestone::is_achieved);

    achieved.sort_by(|a, b| {
        a.achieved_at
            .cmp(&b.achieved_at)
            .then(a.kind.cmp(&b.kind))
            .then(a.target.cmp(&b.target))
    });
    upcoming.sort_by(|a, b| {
        b.progress_percent
            .total_cmp(&a.progress_percent)
            .then(a.kind.cmp(&b.kind))
            .then(a.target.cmp(&b.target))
    });

    MilestoneTimeline {
        achieved,
        upcoming,
        all_available,
    }
}
