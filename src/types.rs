//! Common Types and Constants
//!
//! Read-only entity records supplied by the data-access layer, plus the
//! constants shared across all analytics modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Highest curriculum level
pub const MAX_LEVEL: u8 = 60;

/// Lowest curriculum level
pub const MIN_LEVEL: u8 = 1;

/// Subject identifier as issued by the curriculum provider
pub type SubjectId = u64;

// ==================== SRS Stage ====================

/// Position on the review ladder.
///
/// 0 = locked, 1-4 = apprentice, 5-6 = guru, 7 = master, 8 = enlightened,
/// 9 = burned. Out-of-range values are clamped to burned on ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct SrsStage(u8);

impl SrsStage {
    pub const LOCKED: SrsStage = SrsStage(0);
    pub const APPRENTICE_1: SrsStage = SrsStage(1);
    pub const APPRENTICE_2: SrsStage = SrsStage(2);
    pub const APPRENTICE_3: SrsStage = SrsStage(3);
    pub const APPRENTICE_4: SrsStage = SrsStage(4);
    pub const GURU_1: SrsStage = SrsStage(5);
    pub const GURU_2: SrsStage = SrsStage(6);
    pub const MASTER: SrsStage = SrsStage(7);
    pub const ENLIGHTENED: SrsStage = SrsStage(8);
    pub const BURNED: SrsStage = SrsStage(9);

    pub fn new(value: u8) -> Self {
        SrsStage(value.min(Self::BURNED.0))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Stages that still take part in reviews (everything but locked and burned)
    pub fn is_active(self) -> bool {
        self != Self::LOCKED && self != Self::BURNED
    }

    pub fn is_apprentice(self) -> bool {
        (Self::APPRENTICE_1..=Self::APPRENTICE_4).contains(&self)
    }

    /// Guru through enlightened, i.e. passed and not yet burned
    pub fn is_guru_to_enlightened(self) -> bool {
        (Self::GURU_1..=Self::ENLIGHTENED).contains(&self)
    }

    pub fn is_burned(self) -> bool {
        self == Self::BURNED
    }

    /// Move up one rung, stopping at burned
    pub fn promoted(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// Move down `by` rungs, never below the first apprentice stage
    pub fn demoted(self, by: u8) -> Self {
        Self::new(self.0.saturating_sub(by).max(Self::APPRENTICE_1.0))
    }
}

impl From<u8> for SrsStage {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<SrsStage> for u8 {
    fn from(stage: SrsStage) -> Self {
        stage.0
    }
}

// ==================== Subjects ====================

/// Kind of curriculum item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Radical,
    Kanji,
    Vocabulary,
    KanaVocabulary,
}

impl SubjectType {
    /// Radicals and kana-only vocabulary are meaning-only items
    pub fn has_reading(self) -> bool {
        matches!(self, SubjectType::Kanji | SubjectType::Vocabulary)
    }

    /// Bucket used by per-type breakdowns (kana vocabulary folds into vocabulary)
    pub fn category(self) -> SubjectType {
        match self {
            SubjectType::KanaVocabulary => SubjectType::Vocabulary,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub meaning: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default = "default_true")]
    pub accepted_answer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KanjiReadingKind {
    Onyomi,
    Kunyomi,
    Nanori,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanjiReading {
    pub reading: String,
    pub kind: KanjiReadingKind,
    #[serde(default)]
    pub primary: bool,
    #[serde(default = "default_true")]
    pub accepted_answer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyReading {
    pub reading: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default = "default_true")]
    pub accepted_answer: bool,
}

/// Variant-specific subject data, decided once at ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum SubjectDetail {
    Radical {
        #[serde(default, rename = "characterImageUrl")]
        character_image_url: Option<String>,
    },
    Kanji {
        #[serde(default)]
        readings: Vec<KanjiReading>,
    },
    Vocabulary {
        #[serde(default)]
        readings: Vec<VocabularyReading>,
    },
    KanaVocabulary,
}

/// Curriculum item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub level: u8,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub component_subject_ids: Vec<SubjectId>,
    /// Removed from the curriculum
    #[serde(default)]
    pub removed: bool,
    #[serde(flatten)]
    pub detail: SubjectDetail,
}

impl Subject {
    pub fn subject_type(&self) -> SubjectType {
        match self.detail {
            SubjectDetail::Radical { .. } => SubjectType::Radical,
            SubjectDetail::Kanji { .. } => SubjectType::Kanji,
            SubjectDetail::Vocabulary { .. } => SubjectType::Vocabulary,
            SubjectDetail::KanaVocabulary => SubjectType::KanaVocabulary,
        }
    }

    pub fn primary_meaning(&self) -> Option<&str> {
        self.meanings
            .iter()
            .find(|m| m.primary)
            .or_else(|| self.meanings.first())
            .map(|m| m.meaning.as_str())
    }

    /// Characters when present, otherwise the primary meaning (image-only radicals)
    pub fn label(&self) -> String {
        self.characters
            .clone()
            .or_else(|| self.primary_meaning().map(str::to_string))
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

// ==================== Learner Records ====================

/// One learner's progress on one subject
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub subject_id: SubjectId,
    pub subject_type: SubjectType,
    pub srs_stage: SrsStage,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub available_at: Option<DateTime<Utc>>,
    /// First time the item reached guru. Never cleared on regression.
    #[serde(default)]
    pub passed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub burned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hidden: bool,
}

impl Assignment {
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }
}

/// Cumulative answer counts per subject
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatistic {
    pub subject_id: SubjectId,
    pub subject_type: SubjectType,
    #[serde(default)]
    pub meaning_correct: u32,
    #[serde(default)]
    pub meaning_incorrect: u32,
    #[serde(default)]
    pub reading_correct: u32,
    #[serde(default)]
    pub reading_incorrect: u32,
    #[serde(default)]
    pub percentage_correct: u32,
    #[serde(default)]
    pub hidden: bool,
}

impl ReviewStatistic {
    /// Counts with the reading half zeroed for meaning-only subject types
    pub fn counts_for(&self, subject_type: SubjectType) -> AnswerCounts {
        let (reading_correct, reading_incorrect) = if subject_type.has_reading() {
            (self.reading_correct, self.reading_incorrect)
        } else {
            (0, 0)
        };
        AnswerCounts {
            meaning_correct: self.meaning_correct as u64,
            meaning_incorrect: self.meaning_incorrect as u64,
            reading_correct: reading_correct as u64,
            reading_incorrect: reading_incorrect as u64,
        }
    }

    /// Counts trusted according to the record's own type tag
    pub fn counts(&self) -> AnswerCounts {
        self.counts_for(self.subject_type)
    }
}

/// Answer tallies after type filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerCounts {
    pub meaning_correct: u64,
    pub meaning_incorrect: u64,
    pub reading_correct: u64,
    pub reading_incorrect: u64,
}

impl AnswerCounts {
    pub fn correct(&self) -> u64 {
        self.meaning_correct + self.reading_correct
    }

    pub fn incorrect(&self) -> u64 {
        self.meaning_incorrect + self.reading_incorrect
    }

    pub fn total(&self) -> u64 {
        self.correct() + self.incorrect()
    }

    pub fn meaning_total(&self) -> u64 {
        self.meaning_correct + self.meaning_incorrect
    }

    pub fn reading_total(&self) -> u64 {
        self.reading_correct + self.reading_incorrect
    }

    pub fn add(&mut self, other: &AnswerCounts) {
        self.meaning_correct += other.meaning_correct;
        self.meaning_incorrect += other.meaning_incorrect;
        self.reading_correct += other.reading_correct;
        self.reading_incorrect += other.reading_incorrect;
    }
}

/// One attempt at a level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgression {
    pub level: u8,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub passed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// All four collections for one learner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub subjects: Vec<Subject>,
    pub assignments: Vec<Assignment>,
    pub review_statistics: Vec<ReviewStatistic>,
    pub level_progressions: Vec<LevelProgression>,
}

fn default_true() -> bool {
    true
}
