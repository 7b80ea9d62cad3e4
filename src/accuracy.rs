//! Answer accuracy rollups
//!
//! Reading answers only count for kanji and vocabulary. A radical or kana
//! vocabulary record carrying reading tallies has them ignored.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::numeric::{percentage, round_to};
use crate::types::{AnswerCounts, ReviewStatistic, Subject, SubjectType};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAccuracy {
    pub overall: f64,
    pub meaning: f64,
    /// `None` for types without a reading
    pub reading: Option<f64>,
    pub total_answers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyByType {
    pub radical: TypeAccuracy,
    pub kanji: TypeAccuracy,
    pub vocabulary: TypeAccuracy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyMetrics {
    pub overall: f64,
    pub meaning: f64,
    pub reading: f64,
    pub total_answers: u64,
    pub by_type: AccuracyByType,
    pub by_level: BTreeMap<u8, f64>,
}

fn pct(correct: u64, total: u64) -> f64 {
    round_to(percentage(correct, total), 2)
}

impl TypeAccuracy {
    fn from_counts(counts: &AnswerCounts, has_reading: bool) -> Self {
        Self {
            overall: pct(counts.correct(), counts.total()),
            meaning: pct(counts.meaning_correct, counts.meaning_total()),
            reading: has_reading.then(|| pct(counts.reading_correct, counts.reading_total())),
            total_answers: counts.total(),
        }
    }
}

pub fn accuracy_metrics(review_statistics: &[ReviewStatistic], subjects: &[Subject]) -> AccuracyMetrics {
    let catalog = Catalog::new(subjects, &[]);

    let mut overall = AnswerCounts::default();
    let mut by_type: BTreeMap<SubjectType, AnswerCounts> = BTreeMap::new();
    let mut by_level: BTreeMap<u8, AnswerCounts> = BTreeMap::new();

    for stat in review_statistics.iter().filter(|s| !s.hidden) {
        let Some(subject) = catalog.subject(stat.subject_id) else {
            tracing::debug!(subject_id = stat.subject_id, "review statistic without subject");
            continue;
        };
        let subject_type = subject.subject_type();
        let counts = stat.counts_for(subject_type);

        overall.add(&counts);
        by_type.entry(subject_type.category()).or_default().add(&counts);
        by_level.entry(subject.level).or_default().add(&counts);
    }

    let type_accuracy = |t: SubjectType| {
        let counts = by_type.get(&t).copied().unwrap_or_default();
        TypeAccuracy::from_counts(&counts, t.has_reading())
    };

    AccuracyMetrics {
        overall: pct(overall.correct(), overall.total()),
        meaning: pct(overall.meaning_correct, overall.meaning_total()),
        reading: pct(overall.reading_correct, overall.reading_total()),
        total_answers: overall.total(),
        by_type: AccuracyByType {
            radical: type_accuracy(SubjectType::Radical),
            kanji: type_accuracy(SubjectType::Kanji),
            vocabulary: type_accuracy(SubjectType::Vocabulary),
        },
        by_level: by_level
            .into_iter()
            .map(|(level, counts)| (level, pct(counts.correct(), counts.total())))
            .collect(),
    }
}
