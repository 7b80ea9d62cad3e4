//! Knowledge stability
//!
//! `passed_at` is sticky: an item that reached guru once stays "passed" even
//! after falling back to apprentice. Those regressed items are the fragile
//! ones. Burned items are left out entirely.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::numeric::round_to;
use crate::types::{Assignment, SrsStage, Subject, SubjectId, SubjectType};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRiskItem {
    pub subject_id: SubjectId,
    pub subject_type: SubjectType,
    pub level: u8,
    pub characters: Option<String>,
    pub meaning: Option<String>,
    pub srs_stage: SrsStage,
    pub passed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeStability {
    pub total_passed: usize,
    pub solid: usize,
    pub fragile: usize,
    /// solid / passed, 1 when nothing has been passed
    pub stability_ratio: f64,
    /// Fragile items, most regressed first, then longest fragile first
    pub at_risk: Vec<AtRiskItem>,
}

pub fn knowledge_stability(subjects: &[Subject], assignments: &[Assignment]) -> KnowledgeStability {
    let catalog = Catalog::new(subjects, assignments);
    let mut solid = 0;
    let mut at_risk = Vec::new();

    for assignment in assignments {
        if assignment.hidden || assignment.srs_stage.is_burned() {
            continue;
        }
        let Some(passed_at) = assignment.passed_at else {
            continue;
        };
        let Some(subject) = catalog.subject(assignment.subject_id) else {
            continue;
        };

        if assignment.srs_stage.is_guru_to_enlightened() {
            solid += 1;
        } else if assignment.srs_stage.is_apprentice() {
            at_risk.push(AtRiskItem {
                subject_id: subject.id,
                subject_type: subject.subject_type(),
                level: subject.level,
                characters: subject.characters.clone(),
                meaning: subject.primary_meaning().map(str::to_string),
                srs_stage: assignment.srs_stage,
                passed_at,
            });
        }
    }

    at_risk.sort_by(|a, b| {
        a.srs_stage
            .cmp(&b.srs_stage)
            .then(a.passed_at.cmp(&b.passed_at))
            .then(a.subject_id.cmp(&b.subject_id))
    });

    let fragile = at_risk.len();
    let total_passed = solid + fragile;
    let stability_ratio = if total_passed == 0 {
        1.0
    } else {
        round_to(solid as f64 / total_passed as f64, 4)
    };

    KnowledgeStability {
        total_passed,
        solid,
        fragile,
        stability_ratio,
        at_risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubjectDetail;
    use chrono::TimeZone;

    fn kanji(id: SubjectId) -> Subject {
        Subject {
            id,
            level: 4,
            characters: Some("字".into()),
            meanings: vec![],
            component_subject_ids: vec![],
            removed: false,
            detail: SubjectDetail::Kanji { readings: vec![] },
        }
    }

    fn assignment(subject_id: SubjectId, stage: u8, passed_day: Option<u32>) -> Assignment {
        Assignment {
            subject_id,
            subject_type: SubjectType::Kanji,
            srs_stage: SrsStage::new(stage),
            unlocked_at: None,
            started_at: None,
            available_at: None,
            passed_at: passed_day.map(|d| Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()),
            burned_at: None,
            hidden: false,
        }
    }

    #[test]
    fn test_regressed_items_are_fragile() {
        let subjects: Vec<Subject> = (1..=6).map(kanji).collect();
        let assignments = vec![
            assignment(1, 5, Some(1)),
            assignment(2, 8, Some(2)),
            assignment(3, 3, Some(9)),
            assignment(4, 1, Some(20)),
            assignment(5, 3, Some(4)),
            assignment(6, 2, None),
        ];
        let s = knowledge_stability(&subjects, &assignments);
        assert_eq!(s.solid, 2);
        assert_eq!(s.fragile, 3);
        assert_eq!(s.total_passed, 5);
        assert_eq!(s.stability_ratio, 0.4);
        let order: Vec<SubjectId> = s.at_risk.iter().map(|i| i.subject_id).collect();
        assert_eq!(order, vec![4, 5, 3]);
    }

    #[test]
    fn test_burned_and_hidden_are_excluded() {
        let subjects: Vec<Subject> = (1..=3).map(kanji).collect();
        let mut hidden = assignment(3, 2, Some(1));
        hidden.hidden = true;
        let assignments = vec![assignment(1, 9, Some(1)), assignment(2, 6, Some(1)), hidden];
        let s = knowledge_stability(&subjects, &assignments);
        assert_eq!(s.total_passed, 1);
        assert_eq!(s.stability_ratio, 1.0);
        assert!(s.at_risk.is_empty());
    }

    #[test]
    fn test_nothing_passed_is_fully_stable() {
        let s = knowledge_stability(&[kanji(1)], &[assignment(1, 2, None)]);
        assert_eq!(s.total_passed, 0);
        assert_eq!(s.stability_ratio, 1.0);
    }
}
