//! Level pace analysis and completion projection.

pub mod projection;
pub mod stats;

pub use projection::{project_completion, LevelProjection, ScenarioProjection};
pub use stats::{
    analyze_pace, level_durations, median_absolute_deviation, ClassifiedLevel, ExcludedLevel,
    ExclusionReason, LevelDuration, PaceAnalysis, PaceBands, PaceClass, RobustStats,
};
