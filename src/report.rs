//! One-call analysis over a learner snapshot.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::accuracy::{accuracy_metrics, AccuracyMetrics};
use crate::catalog::current_level;
use crate::config::AnalyticsConfig;
use crate::error::{InsightError, Result};
use crate::forecast::{aggregate_weeks, forecast_workload, WeeklyForecast, WorkloadForecast};
use crate::leech::{analyze_leeches, LeechReport};
use crate::leveling::{forecast_level_progress, LevelForecast};
use crate::milestones::{track_milestones, MilestoneTimeline};
use crate::pace::{project_completion, LevelProjection};
use crate::stability::{knowledge_stability, KnowledgeStability};
use crate::types::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub learner_id: String,
    pub generated_at: DateTime<Utc>,
    pub current_level: u8,
    pub workload: WorkloadForecast,
    pub weekly: Vec<WeeklyForecast>,
    pub projection: LevelProjection,
    pub level_forecast: LevelForecast,
    pub leeches: LeechReport,
    pub accuracy: AccuracyMetrics,
    pub stability: KnowledgeStability,
    pub milestones: MilestoneTimeline,
}

/// Run every analysis against `snapshot` as of `now`.
///
/// Pure given its inputs: the same snapshot, config, learner and instant give
/// the same report.
pub fn analyze(
    snapshot: &Snapshot,
    config: &AnalyticsConfig,
    learner_id: &str,
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let level = current_level(
        &snapshot.level_progressions,
        &snapshot.subjects,
        &snapshot.assignments,
    );
    let policy = config.forecast.policy();

    let workload = forecast_workload(
        &snapshot.assignments,
        &snapshot.review_statistics,
        &config.forecast,
        learner_id,
        now,
        &policy,
    );
    let weekly = aggregate_weeks(&workload.daily, config.forecast.week_start);
    let projection = project_completion(level, &snapshot.level_progressions, &config.pace, now);
    let level_forecast = forecast_level_progress(
        &snapshot.subjects,
        &snapshot.assignments,
        level,
        config.forecast.lessons_per_day,
        config.forecast.horizon_days,
        &config.leveling,
    );
    let leeches = analyze_leeches(
        &snapshot.review_statistics,
        &snapshot.subjects,
        &snapshot.assignments,
        &config.leech,
    );
    let accuracy = accuracy_metrics(&snapshot.review_statistics, &snapshot.subjects);
    let stability = knowledge_stability(&snapshot.subjects, &snapshot.assignments);
    let milestones = track_milestones(
        &snapshot.subjects,
        &snapshot.assignments,
        &snapshot.level_progressions,
        level,
    );

    tracing::info!(
        learner_id,
        current_level = level,
        forecast_reviews = workload.metrics.total_reviews,
        leeches = leeches.leeches.len(),
        at_risk = stability.at_risk.len(),
        next_milestone = milestones.next().map(|m| m.label.as_str()),
        "analysis complete"
    );

    AnalyticsReport {
        learner_id: learner_id.to_string(),
        generated_at: now,
        current_level: level,
        workload,
        weekly,
        projection,
        level_forecast,
        leeches,
        accuracy,
        stability,
        milestones,
    }
}

/// Read a snapshot from a JSON file
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| InsightError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: Snapshot = serde_json::from_str(&raw)?;
    tracing::debug!(
        path = %path.display(),
        subjects = snapshot.subjects.len(),
        assignments = snapshot.assignments.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::IncorrectPolicy;
    use crate::types::SrsStage;
    use chrono::TimeZone;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "subjects": [
            {"id": 1, "object": "radical", "level": 1, "characters": "一",
             "meanings": [{"meaning": "Ground", "primary": true}]},
            {"id": 2, "object": "kanji", "level": 1, "characters": "一",
             "meanings": [{"meaning": "One", "primary": true}], "componentSubjectIds": [1]}
        ],
        "assignments": [
            {"subjectId": 1, "subjectType": "radical", "srsStage": 5,
             "startedAt": "2024-01-01T00:00:00Z", "availableAt": "2024-01-02T00:00:00Z",
             "passedAt": "2024-01-05T00:00:00Z"}
        ],
        "reviewStatistics": [
            {"subjectId": 1, "subjectType": "radical", "meaningCorrect": 4, "meaningIncorrect": 1}
        ],
        "levelProgressions": [
            {"level": 1, "unlockedAt": "2024-01-01T00:00:00Z", "createdAt": "2024-01-01T00:00:00Z"}
        ]
    }"#;

    #[test]
    fn test_load_and_analyze() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let snapshot = load_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.subjects.len(), 2);

        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let report = analyze(&snapshot, &AnalyticsConfig::default(), "learner-1", now);
        assert_eq!(report.current_level, 1);
        assert_eq!(report.workload.daily.len(), 30);
        assert_eq!(report.level_forecast.levels[0].pending.kanji, 1);
        assert_eq!(report.accuracy.overall, 80.0);
        assert_eq!(report.stability.solid, 1);
        assert!(report.leeches.leeches.is_empty());

        let again = analyze(&snapshot, &AnalyticsConfig::default(), "learner-1", now);
        assert_eq!(report, again);
    }

    #[test]
    fn test_incorrect_policy_reaches_forecast() {
        // every answer is wrong: an enlightened item due now
        let snapshot: Snapshot = serde_json::from_str(
            r#"{
            "subjects": [{"id": 7, "object": "kanji", "level": 3, "characters": "七",
                          "meanings": [{"meaning": "Seven", "primary": true}]}],
            "assignments": [{"subjectId": 7, "subjectType": "kanji", "srsStage": 8,
                             "startedAt": "2023-06-01T00:00:00Z",
                             "availableAt": "2024-01-10T12:00:00Z"}],
            "reviewStatistics": [{"subjectId": 7, "subjectType": "kanji",
                                  "meaningCorrect": 0, "meaningIncorrect": 6}]
        }"#,
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();

        let mut config = AnalyticsConfig::default();
        config.forecast.lessons_per_day = 0;
        let penalty = analyze(&snapshot, &config, "learner-1", now);

        config.forecast.incorrect_policy = IncorrectPolicy::ResetTo {
            stage: SrsStage::APPRENTICE_1,
        };
        let reset = analyze(&snapshot, &config, "learner-1", now);

        // enlightened drops to guru 2 and waits two weeks
        assert_eq!(penalty.workload.daily[0].total, 1);
        // back to apprentice 1: reviewed at 12:00, 16:00 and 20:00
        assert_eq!(reset.workload.daily[0].total, 3);
        assert_eq!(reset.workload.simulated_reviews, 100);
        assert!(penalty.workload.simulated_reviews < reset.workload.simulated_reviews);
    }

    #[test]
    fn test_never_passed_sentinel_does_not_break_report() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"levelProgressions": [
                {"level": 1, "unlockedAt": "2023-01-01T00:00:00Z",
                 "passedAt": "9999-12-31T00:00:00Z", "createdAt": "2023-01-01T00:00:00Z"},
                {"level": 2, "unlockedAt": "2023-02-01T00:00:00Z", "createdAt": "2023-02-01T00:00:00Z"}
            ]}"#,
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let report = analyze(&snapshot, &AnalyticsConfig::default(), "learner-1", now);

        assert_eq!(report.projection.expected.completion_date, DateTime::<Utc>::MAX_UTC);
        assert!(serde_json::to_string(&report).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshot(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, InsightError::Io { .. }));
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(load_snapshot(file.path()), Err(InsightError::Json(_))));
    }
}
