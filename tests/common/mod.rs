#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use srs_insight::types::{
    Assignment, LevelProgression, Meaning, ReviewStatistic, Snapshot, SrsStage, Subject,
    SubjectDetail, SubjectId, SubjectType,
};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

pub fn subject(id: SubjectId, level: u8, subject_type: SubjectType) -> Subject {
    let detail = match subject_type {
        SubjectType::Radical => SubjectDetail::Radical {
            character_image_url: None,
        },
        SubjectType::Kanji => SubjectDetail::Kanji { readings: vec![] },
        SubjectType::Vocabulary => SubjectDetail::Vocabulary { readings: vec![] },
        SubjectType::KanaVocabulary => SubjectDetail::KanaVocabulary,
    };
    Subject {
        id,
        level,
        characters: Some(format!("{id}")),
        meanings: vec![Meaning {
            meaning: format!("meaning-{id}"),
            primary: true,
            accepted_answer: true,
        }],
        component_subject_ids: vec![],
        removed: false,
        detail,
    }
}

pub fn assignment(subject: &Subject, stage: SrsStage, available_at: Option<DateTime<Utc>>) -> Assignment {
    Assignment {
        subject_id: subject.id,
        subject_type: subject.subject_type(),
        srs_stage: stage,
        unlocked_at: Some(now() - Duration::days(60)),
        started_at: Some(now() - Duration::days(30)),
        available_at,
        passed_at: stage.is_guru_to_enlightened().then(|| now() - Duration::days(10)),
        burned_at: None,
        hidden: false,
    }
}

pub fn statistic(subject: &Subject, correct: u32, incorrect: u32) -> ReviewStatistic {
    ReviewStatistic {
        subject_id: subject.id,
        subject_type: subject.subject_type(),
        meaning_correct: correct,
        meaning_incorrect: incorrect,
        reading_correct: 0,
        reading_incorrect: 0,
        percentage_correct: 0,
        hidden: false,
    }
}

/// Consecutive levels starting at 1 taking `days[i]` each
pub fn level_history(days: &[f64]) -> Vec<LevelProgression> {
    let mut t = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    days.iter()
        .enumerate()
        .map(|(i, &d)| {
            let unlocked = t;
            t += Duration::seconds((d * 86_400.0) as i64);
            LevelProgression {
                level: i as u8 + 1,
                unlocked_at: Some(unlocked),
                passed_at: Some(t),
                created_at: unlocked,
            }
        })
        .collect()
}

/// A mid-curriculum learner: items spread over every active stage, some
/// already overdue, plus unstarted lessons on the current level.
pub fn learner_snapshot() -> Snapshot {
    let mut subjects = Vec::new();
    let mut assignments = Vec::new();
    let mut review_statistics = Vec::new();
    let types = [SubjectType::Radical, SubjectType::Kanji, SubjectType::Vocabulary];

    for id in 1..=120u64 {
        let level = (id % 5) as u8 + 1;
        let s = subject(id, level, types[(id % 3) as usize]);
        let stage = SrsStage::new((id % 8) as u8 + 1);
        let available_at = now() + Duration::hours(id as i64 * 3 - 40);
        assignments.push(assignment(&s, stage, Some(available_at)));
        review_statistics.push(statistic(&s, 20 + (id % 7) as u32, (id % 9) as u32));
        subjects.push(s);
    }
    for id in 121..=160u64 {
        subjects.push(subject(id, 6, types[(id % 3) as usize]));
    }

    Snapshot {
        subjects,
        assignments,
        review_statistics,
        level_progressions: level_history(&[9.0, 10.0, 12.0, 11.0, 30.0, 8.0]),
    }
}
