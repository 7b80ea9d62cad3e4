//! Leech detection
//!
//! A leech is an item the learner keeps reviewing and keeps missing. Items are
//! flagged when they have at least `min_reviews` answers and an accuracy at or
//! below `max_accuracy`, then ranked by a severity blend:
//!
//! ```text
//! severity = 0.4 × min(incorrect / 50, 1) × 100
//!          + 0.3 × min(total / 100, 1) × 100
//!          + 0.3 × (100 - accuracy)
//! ```
//!
//! Two side analyses run over the flagged set: look-alike pairs and radicals
//! shared by many leeches.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::LeechThresholds;
use crate::numeric::{percentage, round_to};
use crate::types::{Assignment, ReviewStatistic, SrsStage, Subject, SubjectId, SubjectType};

const ERROR_WEIGHT: f64 = 0.4;
const VOLUME_WEIGHT: f64 = 0.3;
const INACCURACY_WEIGHT: f64 = 0.3;
const ERROR_SATURATION: f64 = 50.0;
const VOLUME_SATURATION: f64 = 100.0;

/// Jaccard overlap of character sets at which two leeches count as confusable
pub const CONFUSABLE_SIMILARITY: f64 = 0.5;

/// Distinct leeches a radical must appear in to be reported as a root cause
pub const ROOT_CAUSE_MIN_LEECHES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeechItem {
    pub subject_id: SubjectId,
    pub subject_type: SubjectType,
    pub level: u8,
    pub characters: Option<String>,
    pub meaning: Option<String>,
    pub srs_stage: SrsStage,
    pub total_reviews: u64,
    pub incorrect: u64,
    pub accuracy: f64,
    /// 100 when the item has never been asked for its meaning
    pub meaning_accuracy: f64,
    /// 100 for meaning-only items
    pub reading_accuracy: f64,
    pub severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusablePair {
    pub first: SubjectId,
    pub second: SubjectId,
    pub first_characters: String,
    pub second_characters: String,
    pub shared_characters: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootCauseRadical {
    pub radical_id: SubjectId,
    pub label: String,
    pub leech_count: usize,
    pub affected_subject_ids: Vec<SubjectId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeechReport {
    pub thresholds: LeechThresholds,
    pub leeches: Vec<LeechItem>,
    pub confusable_pairs: Vec<ConfusablePair>,
    pub root_causes: Vec<RootCauseRadical>,
}

pub fn severity_score(incorrect: u64, total_reviews: u64, accuracy: f64) -> f64 {
    let errors = (incorrect as f64 / ERROR_SATURATION).min(1.0) * 100.0;
    let volume = (total_reviews as f64 / VOLUME_SATURATION).min(1.0) * 100.0;
    ERROR_WEIGHT * errors + VOLUME_WEIGHT * volume + INACCURACY_WEIGHT * (100.0 - accuracy)
}

/// Sub-accuracy that reads as perfect when nothing was asked
fn sub_accuracy(correct: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        percentage(correct, total)
    }
}

/// Flag leeches, highest severity first
pub fn detect_leeches(
    review_statistics: &[ReviewStatistic],
    subjects: &[Subject],
    assignments: &[Assignment],
    thresholds: &LeechThresholds,
) -> Vec<LeechItem> {
    let catalog = Catalog::new(subjects, assignments);
    let mut leeches = Vec::new();
    let mut skipped = 0usize;

    for stat in review_statistics.iter().filter(|s| !s.hidden) {
        let (Some(subject), Some(assignment)) = (
            catalog.subject(stat.subject_id),
            catalog.assignment(stat.subject_id),
        ) else {
            skipped += 1;
            continue;
        };
        if assignment.hidden {
            continue;
        }
        if assignment.srs_stage.is_burned() && !thresholds.include_burned {
            continue;
        }

        let subject_type = subject.subject_type();
        let counts = stat.counts_for(subject_type);
        let total = counts.total();
        let accuracy = percentage(counts.correct(), total);
        if total < thresholds.min_reviews as u64 || accuracy > thresholds.max_accuracy {
            continue;
        }

        leeches.push(LeechItem {
            subject_id: subject.id,
            subject_type,
            level: subject.level,
            characters: subject.characters.clone(),
            meaning: subject.primary_meaning().map(str::to_string),
            srs_stage: assignment.srs_stage,
            total_reviews: total,
            incorrect: counts.incorrect(),
            accuracy: round_to(accuracy, 2),
            meaning_accuracy: round_to(
                sub_accuracy(counts.meaning_correct, counts.meaning_total()),
                2,
            ),
            reading_accuracy: round_to(
                sub_accuracy(counts.reading_correct, counts.reading_total()),
                2,
            ),
            severity: round_to(severity_score(counts.incorrect(), total, accuracy), 2),
        });
    }

    if skipped > 0 {
        tracing::debug!(skipped, "review statistics without subject or assignment");
    }

    leeches.sort_by(|a, b| {
        b.severity
            .total_cmp(&a.severity)
            .then(a.subject_id.cmp(&b.subject_id))
    });
    leeches
}

fn jaccard(a: &BTreeSet<char>, b: &BTreeSet<char>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Leech pairs whose written forms overlap heavily
pub fn find_confusable_pairs(leeches: &[LeechItem]) -> Vec<ConfusablePair> {
    let written: Vec<(&LeechItem, &str, BTreeSet<char>)> = leeches
        .iter()
        .filter_map(|l| {
            let chars = l.characters.as_deref()?;
            Some((l, chars, chars.chars().collect()))
        })
        .collect();

    let mut pairs = Vec::new();
    for (i, (a, a_chars, a_set)) in written.iter().enumerate() {
        for (b, b_chars, b_set) in &written[i + 1..] {
            let similarity = jaccard(a_set, b_set);
            if similarity < CONFUSABLE_SIMILARITY {
                continue;
            }
            let (first, second) = if a.subject_id <= b.subject_id {
                ((a, a_chars), (b, b_chars))
            } else {
                ((b, b_chars), (a, a_chars))
            };
            pairs.push(ConfusablePair {
                first: first.0.subject_id,
                second: second.0.subject_id,
                first_characters: first.1.to_string(),
                second_characters: second.1.to_string(),
                shared_characters: a_set.intersection(b_set).collect(),
                similarity: round_to(similarity, 2),
            });
        }
    }

    pairs.sort_by(|x, y| {
        y.similarity
            .total_cmp(&x.similarity)
            .then(x.first.cmp(&y.first))
            .then(x.second.cmp(&y.second))
    });
    pairs
}

/// Radicals reachable from `subject`: its own radical components, and for
/// vocabulary the radicals of its component kanji.
fn radicals_of(subject: &Subject, catalog: &Catalog<'_>) -> BTreeSet<SubjectId> {
    let mut found = BTreeSet::new();
    for &component_id in &subject.component_subject_ids {
        let Some(component) = catalog.subject(component_id) else {
            continue;
        };
        match component.subject_type() {
            SubjectType::Radical => {
                found.insert(component_id);
            }
            SubjectType::Kanji => {
                found.extend(
                    component
                        .component_subject_ids
                        .iter()
                        .copied()
                        .filter(|id| {
                            catalog
                                .subject(*id)
                                .is_some_and(|s| s.subject_type() == SubjectType::Radical)
                        }),
                );
            }
            _ => {}
        }
    }
    found
}

/// Radicals shared by at least [`ROOT_CAUSE_MIN_LEECHES`] distinct leeches
pub fn find_root_causes(
    leeches: &[LeechItem],
    subjects: &[Subject],
    assignments: &[Assignment],
) -> Vec<RootCauseRadical> {
    let catalog = Catalog::new(subjects, assignments);
    let mut tally: BTreeMap<SubjectId, BTreeSet<SubjectId>> = BTreeMap::new();

    for leech in leeches {
        let Some(subject) = catalog.subject(leech.subject_id) else {
            continue;
        };
        for radical_id in radicals_of(subject, &catalog) {
            tally.entry(radical_id).or_default().insert(leech.subject_id);
        }
    }

    let mut causes: Vec<RootCauseRadical> = tally
        .into_iter()
        .filter(|(_, affected)| affected.len() >= ROOT_CAUSE_MIN_LEECHES)
        .map(|(radical_id, affected)| RootCauseRadical {
            radical_id,
            label: catalog
                .subject(radical_id)
                .map(Subject::label)
                .unwrap_or_else(|| format!("#{radical_id}")),
            leech_count: affected.len(),
            affected_subject_ids: affected.into_iter().collect(),
        })
        .collect();

    causes.sort_by(|a, b| {
        b.leech_count
            .cmp(&a.leech_count)
            .then(a.radical_id.cmp(&b.radical_id))
    });
    causes
}

pub fn analyze_leeches(
    review_statistics: &[ReviewStatistic],
    subjects: &[Subject],
    assignments: &[Assignment],
    thresholds: &LeechThresholds,
) -> LeechReport {
    let leeches = detect_leeches(review_statistics, subjects, assignments, thresholds);
    let confusable_pairs = find_confusable_pairs(&leeches);
    let root_causes = find_root_causes(&leeches, subjects, assignments);

    tracing::debug!(
        leeches = leeches.len(),
        confusable_pairs = confusable_pairs.len(),
        root_causes = root_causes.len(),
        "leech analysis finished"
    );

    LeechReport {
        thresholds: thresholds.clone(),
        leeches,
        confusable_pairs,
        root_causes,
    }
}
