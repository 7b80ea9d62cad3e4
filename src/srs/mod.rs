//! SRS transition policy
//!
//! The simulator never hard-codes the review ladder. It asks an [`SrsPolicy`]
//! how long an item waits at a stage and where an answer moves it.
//!
//! [`SrsLadder::standard`] approximates the conventional nine-rung ladder:
//!
//! | stage | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |
//! |---|---|---|---|---|---|---|---|---|
//! | hours | 4 | 8 | 23 | 47 | 167 | 335 | 719 | 2879 |
//!
//! Stage 9 (burned) is terminal and has no interval.

use serde::{Deserialize, Serialize};

use crate::types::SrsStage;

/// Stage-transition table consulted by the trajectory simulator
pub trait SrsPolicy {
    /// Hours an item waits at `stage` before its next review (0 = never)
    fn next_interval_hours(&self, stage: SrsStage) -> u32;

    fn next_stage_on_correct(&self, stage: SrsStage) -> SrsStage;

    fn next_stage_on_incorrect(&self, stage: SrsStage) -> SrsStage;

    fn is_active(&self, stage: SrsStage) -> bool {
        stage.is_active()
    }

    /// Stage a freshly finished lesson enters
    fn lesson_stage(&self) -> SrsStage {
        SrsStage::APPRENTICE_1
    }
}

/// How far an incorrect answer drops an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum IncorrectPolicy {
    /// Drop by a band-dependent penalty, never below apprentice 1
    PenaltyDrop {
        apprentice_drop: u8,
        guru_plus_drop: u8,
    },
    /// Drop a fixed number of stages, never below apprentice 1
    DropBy { stages: u8 },
    /// Send the item straight back to a fixed stage
    ResetTo { stage: SrsStage },
}

impl Default for IncorrectPolicy {
    fn default() -> Self {
        IncorrectPolicy::PenaltyDrop {
            apprentice_drop: 1,
            guru_plus_drop: 2,
        }
    }
}

impl IncorrectPolicy {
    /// Parse `penalty`, `drop:<stages>` or `reset:<stage>`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase().replace('-', "_");
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind.trim(), Some(arg.trim().parse::<u8>().ok()?)),
            None => (s.as_str(), None),
        };
        match (kind, arg) {
            ("penalty" | "penalty_drop", None) => Some(Self::default()),
            ("drop" | "drop_by", Some(stages)) => Some(Self::DropBy { stages }),
            ("reset" | "reset_to", Some(stage)) => Some(Self::ResetTo {
                stage: SrsStage::new(stage),
            }),
            _ => None,
        }
    }
}

/// Named ladder presets selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderPreset {
    #[default]
    Standard,
    Accelerated,
}

impl LadderPreset {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "accelerated" => Some(Self::Accelerated),
            _ => None,
        }
    }

    pub fn ladder(self) -> SrsLadder {
        match self {
            LadderPreset::Standard => SrsLadder::standard(),
            LadderPreset::Accelerated => SrsLadder::accelerated(),
        }
    }
}

/// Table-driven [`SrsPolicy`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsLadder {
    /// Indexed by stage value; entries for locked and burned are ignored
    pub intervals_hours: [u32; 10],
    pub incorrect: IncorrectPolicy,
}

const STANDARD_INTERVALS: [u32; 10] = [0, 4, 8, 23, 47, 167, 335, 719, 2879, 0];

const ACCELERATED_INTERVALS: [u32; 10] = [0, 2, 4, 8, 23, 167, 335, 719, 2879, 0];

impl SrsLadder {
    pub fn standard() -> Self {
        Self {
            intervals_hours: STANDARD_INTERVALS,
            incorrect: IncorrectPolicy::default(),
        }
    }

    /// Halved apprentice intervals used for the first levels of some curricula
    pub fn accelerated() -> Self {
        Self {
            intervals_hours: ACCELERATED_INTERVALS,
            incorrect: IncorrectPolicy::default(),
        }
    }

    pub fn with_incorrect_policy(mut self, incorrect: IncorrectPolicy) -> Self {
        self.incorrect = incorrect;
        self
    }
}

impl Default for SrsLadder {
    fn default() -> Self {
        Self::standard()
    }
}

impl SrsPolicy for SrsLadder {
    fn next_interval_hours(&self, stage: SrsStage) -> u32 {
        if !stage.is_active() {
            return 0;
        }
        self.intervals_hours[stage.index()]
    }

    fn next_stage_on_correct(&self, stage: SrsStage) -> SrsStage {
        if !stage.is_active() {
            return stage;
        }
        stage.promoted()
    }

    fn next_stage_on_incorrect(&self, stage: SrsStage) -> SrsStage {
        if !stage.is_active() {
            return stage;
        }
        match self.incorrect {
            IncorrectPolicy::PenaltyDrop {
                apprentice_drop,
                guru_plus_drop,
            } => {
                let drop = if stage.is_apprentice() {
                    apprentice_drop
                } else {
                    guru_plus_drop
                };
                stage.demoted(drop)
            }
            IncorrectPolicy::DropBy { stages } => stage.demoted(stages),
            IncorrectPolicy::ResetTo { stage: target } => target,
        }
    }
}
