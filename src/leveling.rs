//! Lesson-budget level forecast
//!
//! Spends `lessons/day × days` on the unstarted lessons of each level in
//! order, starting at the learner's current level, and reports where the
//! budget runs out.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::config::LevelingConfig;
use crate::types::{Assignment, Subject, SubjectId, SubjectType, MAX_LEVEL, MIN_LEVEL};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLessons {
    pub radicals: u32,
    pub kanji: u32,
    pub vocabulary: u32,
}

impl PendingLessons {
    pub fn required(&self, include_vocabulary: bool) -> u32 {
        let base = self.radicals + self.kanji;
        if include_vocabulary {
            base + self.vocabulary
        } else {
            base
        }
    }

    fn record(&mut self, subject_type: SubjectType) {
        match subject_type.category() {
            SubjectType::Radical => self.radicals += 1,
            SubjectType::Kanji => self.kanji += 1,
            _ => self.vocabulary += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelLessonPlan {
    pub level: u8,
    pub pending: PendingLessons,
    pub required: u32,
    pub consumed: u32,
    pub completion_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelForecast {
    pub current_level: u8,
    pub projected_level: u8,
    pub completion_percent: u32,
    pub lesson_budget: u64,
    pub lessons_consumed: u64,
    pub levels_gained: u8,
    pub curriculum_completed: bool,
    pub levels: Vec<LevelLessonPlan>,
}

/// Unstarted lessons per level. Removed subjects and subjects whose
/// assignment is hidden are not waiting for a lesson.
pub fn pending_lessons_by_level(
    subjects: &[Subject],
    assignments: &[Assignment],
) -> BTreeMap<u8, PendingLessons> {
    let settled: HashSet<SubjectId> = assignments
        .iter()
        .filter(|a| a.is_started() || a.hidden)
        .map(|a| a.subject_id)
        .collect();

    let mut by_level: BTreeMap<u8, PendingLessons> = BTreeMap::new();
    for subject in subjects {
        if subject.removed || settled.contains(&subject.id) {
            continue;
        }
        by_level
            .entry(subject.level)
            .or_default()
            .record(subject.subject_type());
    }
    by_level
}

pub fn forecast_level_progress(
    subjects: &[Subject],
    assignments: &[Assignment],
    current_level: u8,
    lessons_per_day: u32,
    horizon_days: u32,
    config: &LevelingConfig,
) -> LevelForecast {
    let current_level = current_level.clamp(MIN_LEVEL, MAX_LEVEL);
    let pending = pending_lessons_by_level(subjects, assignments);
    let lesson_budget = lessons_per_day as u64 * horizon_days as u64;

    let mut remaining = lesson_budget;
    let mut projected_level = current_level;
    let mut completion_percent = 0;
    let mut levels = Vec::new();

    for level in current_level..=MAX_LEVEL {
        let tally = pending.get(&level).copied().unwrap_or_default();
        let required = tally.required(config.include_vocabulary);
        projected_level = level;

        if remaining >= required as u64 {
            remaining -= required as u64;
            completion_percent = 100;
            levels.push(LevelLessonPlan {
                level,
                pending: tally,
                required,
                consumed: required,
                completion_percent,
            });
            continue;
        }

        completion_percent = (remaining as f64 / required as f64 * 100.0).round() as u32;
        levels.push(LevelLessonPlan {
            level,
            pending: tally,
            required,
            consumed: remaining as u32,
            completion_percent,
        });
        remaining = 0;
        break;
    }

    let curriculum_completed = projected_level == MAX_LEVEL && completion_percent == 100;

    LevelForecast {
        current_level,
        projected_level,
        completion_percent,
        lesson_budget,
        lessons_consumed: lesson_budget - remaining,
        levels_gained: projected_level - current_level,
        curriculum_completed,
        levels,
    }
}
