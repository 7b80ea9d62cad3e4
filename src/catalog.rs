//! Lookup maps over the ingested collections.
//!
//! Records pointing at a subject that is not in the catalog are skipped
//! silently by every consumer of these maps.

use std::collections::{BTreeMap, HashMap};

use crate::types::{Assignment, LevelProgression, Subject, SubjectId, MAX_LEVEL, MIN_LEVEL};

pub struct Catalog<'a> {
    subjects: HashMap<SubjectId, &'a Subject>,
    assignments: HashMap<SubjectId, &'a Assignment>,
}

impl<'a> Catalog<'a> {
    pub fn new(subjects: &'a [Subject], assignments: &'a [Assignment]) -> Self {
        let subjects = subjects.iter().map(|s| (s.id, s)).collect();
        let assignments = assignments.iter().map(|a| (a.subject_id, a)).collect();
        Self {
            subjects,
            assignments,
        }
    }

    pub fn subject(&self, id: SubjectId) -> Option<&'a Subject> {
        self.subjects.get(&id).copied()
    }

    pub fn assignment(&self, subject_id: SubjectId) -> Option<&'a Assignment> {
        self.assignments.get(&subject_id).copied()
    }
}

/// Pick one record per level.
///
/// A record with a passed timestamp beats one without; otherwise the most
/// recently created record wins.
pub fn dedupe_level_progressions(
    progressions: &[LevelProgression],
) -> BTreeMap<u8, &LevelProgression> {
    let mut by_level: BTreeMap<u8, &LevelProgression> = BTreeMap::new();
    for record in progressions {
        let replace = by_level
            .get(&record.level)
            .map_or(true, |current| prefer(record, current));
        if replace {
            by_level.insert(record.level, record);
        }
    }
    by_level
}

fn prefer(candidate: &LevelProgression, current: &LevelProgression) -> bool {
    match (candidate.passed_at.is_some(), current.passed_at.is_some()) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate.created_at > current.created_at,
    }
}

/// Highest unlocked level, falling back to the highest level with a started
/// assignment, then level 1.
pub fn current_level(
    progressions: &[LevelProgression],
    subjects: &[Subject],
    assignments: &[Assignment],
) -> u8 {
    let from_progressions = dedupe_level_progressions(progressions)
        .values()
        .filter(|p| p.unlocked_at.is_some())
        .map(|p| p.level)
        .max();

    if let Some(level) = from_progressions {
        return level.clamp(MIN_LEVEL, MAX_LEVEL);
    }

    let catalog = Catalog::new(subjects, assignments);
    assignments
        .iter()
        .filter(|a| a.is_started())
        .filter_map(|a| catalog.subject(a.subject_id))
        .map(|s| s.level)
        .max()
        .unwrap_or(MIN_LEVEL)
        .clamp(MIN_LEVEL, MAX_LEVEL)
}
