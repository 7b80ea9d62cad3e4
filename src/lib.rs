//! # srs-insight - SRS curriculum analytics
//!
//! Pure analytics over a learner's subjects, assignments, review statistics
//! and level history:
//!
//! - **Workload forecast** - Monte Carlo simulation of upcoming reviews
//! - **Level pace** - median/MAD outlier screening and level-60 projection
//! - **Lesson budget** - how far a daily lesson allowance carries the learner
//! - **Leeches** - low-accuracy items ranked by severity
//! - **Accuracy, stability, milestones** - progress rollups
//!
//! ## Modules
//!
//! - [`srs`] - review ladder and stage transitions
//! - [`random`] - seeded random source
//! - [`forecast`] - trajectory simulator, daily and weekly workload
//! - [`pace`] - robust pace statistics and completion projection
//! - [`leveling`] - lesson-budget level forecast
//! - [`leech`] - leech detection, confusable pairs, root-cause radicals
//! - [`accuracy`] - answer accuracy by type and level
//! - [`stability`] - solid vs regressed passed items
//! - [`milestones`] - achieved and upcoming milestones
//! - [`report`] - everything at once
//! - [`types`] - shared entities and constants
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use srs_insight::{analyze, AnalyticsConfig, Snapshot};
//!
//! let report = analyze(&Snapshot::default(), &AnalyticsConfig::default(), "learner", Utc::now());
//! assert_eq!(report.current_level, 1);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod numeric;
pub mod random;
pub mod srs;
pub mod types;

pub mod accuracy;
pub mod forecast;
pub mod leech;
pub mod leveling;
pub mod milestones;
pub mod pace;
pub mod report;
pub mod stability;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use config::{
    AnalyticsConfig, AveragingMethod, ForecastConfig, LeechThresholds, LevelingConfig, PaceConfig,
};
pub use error::{InsightError, Result};
pub use random::{RandomSource, SeededRandom};
pub use srs::{IncorrectPolicy, LadderPreset, SrsLadder, SrsPolicy};

pub use accuracy::{accuracy_metrics, AccuracyMetrics, TypeAccuracy};
pub use forecast::{
    aggregate_weeks, forecast_workload, DailyForecast, TrajectorySimulator, WeeklyForecast,
    WorkloadForecast, WorkloadMetrics,
};
pub use leech::{analyze_leeches, detect_leeches, LeechItem, LeechReport};
pub use leveling::{forecast_level_progress, LevelForecast};
pub use milestones::{track_milestones, Milestone, MilestoneTimeline};
pub use pace::{analyze_pace, project_completion, LevelProjection, PaceAnalysis};
pub use report::{analyze, load_snapshot, AnalyticsReport};
pub use stability::{knowledge_stability, KnowledgeStability};
