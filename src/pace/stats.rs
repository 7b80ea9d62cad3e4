//! Robust level-pace statistics
//!
//! Durations are screened with a median/MAD fence so that vacations and
//! resets do not drag the average:
//!
//! - `median` of all durations
//! - `MAD` = median of |d - median|, scaled by 1.4826 to match a Gaussian σ
//! - fence = median + 2 × normalized MAD
//!
//! Durations above the fence are excluded only when exclusion is enabled and
//! at least five samples exist, and never if that would exclude everything.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::dedupe_level_progressions;
use crate::config::PaceConfig;
use crate::numeric::{median, std_dev, trimmed_mean};
use crate::types::LevelProgression;

pub const MAD_SCALE: f64 = 1.4826;
pub const OUTLIER_MADS: f64 = 2.0;
pub const MIN_SAMPLES_FOR_EXCLUSION: usize = 5;
pub const TRIM_FRACTION: f64 = 0.1;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDuration {
    pub level: u8,
    pub days: f64,
    pub unlocked_at: DateTime<Utc>,
    pub passed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceClass {
    Fast,
    Good,
    Slow,
    VerySlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceBands {
    pub fast: f64,
    pub good: f64,
    pub slow: f64,
    pub very_slow: f64,
}

impl PaceBands {
    pub fn from_average(average: f64, sigma: f64) -> Self {
        Self {
            fast: average - 0.5 * sigma,
            good: average,
            slow: average + 0.5 * sigma,
            very_slow: average + 1.5 * sigma,
        }
    }

    pub fn classify(&self, days: f64) -> PaceClass {
        if days < self.fast {
            PaceClass::Fast
        } else if days > self.very_slow {
            PaceClass::VerySlow
        } else if days > self.slow {
            PaceClass::Slow
        } else {
            PaceClass::Good
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum ExclusionReason {
    RobustOutlier { threshold_days: f64 },
    CustomThreshold { threshold_days: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedLevel {
    #[serde(flatten)]
    pub duration: LevelDuration,
    pub class: PaceClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedLevel {
    #[serde(flatten)]
    pub duration: LevelDuration,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobustStats {
    pub sample_count: usize,
    pub included_count: usize,
    pub excluded_count: usize,
    pub median: f64,
    pub mad: f64,
    pub normalized_mad: f64,
    /// Fence actually applied (custom or robust)
    pub outlier_threshold: f64,
    /// Trimmed mean of the included set
    pub average: f64,
    pub included_median: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceAnalysis {
    pub stats: RobustStats,
    pub bands: PaceBands,
    pub included: Vec<ClassifiedLevel>,
    pub excluded: Vec<ExcludedLevel>,
}

impl PaceAnalysis {
    pub fn fastest(&self) -> Option<&ClassifiedLevel> {
        self.included
            .iter()
            .min_by(|a, b| a.duration.days.total_cmp(&b.duration.days))
    }

    pub fn slowest(&self) -> Option<&ClassifiedLevel> {
        self.included
            .iter()
            .max_by(|a, b| a.duration.days.total_cmp(&b.duration.days))
    }
}

/// Completed level durations, one per level, ordered by level.
///
/// Records missing either timestamp or passing before unlocking are dropped.
pub fn level_durations(progressions: &[LevelProgression]) -> Vec<LevelDuration> {
    dedupe_level_progressions(progressions)
        .into_values()
        .filter_map(|record| {
            let unlocked_at = record.unlocked_at?;
            let passed_at = record.passed_at?;
            let seconds = (passed_at - unlocked_at).num_seconds();
            if seconds < 0 {
                tracing::debug!(level = record.level, "discarding negative level duration");
                return None;
            }
            Some(LevelDuration {
                level: record.level,
                days: seconds as f64 / SECONDS_PER_DAY,
                unlocked_at,
                passed_at,
            })
        })
        .collect()
}

/// Median absolute deviation around `center`
pub fn median_absolute_deviation(values: &[f64], center: f64) -> f64 {
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

pub fn analyze_pace(durations: &[LevelDuration], config: &PaceConfig) -> PaceAnalysis {
    let days: Vec<f64> = durations.iter().map(|d| d.days).collect();
    let center = median(&days);
    let mad = median_absolute_deviation(&days, center);
    let normalized_mad = mad * MAD_SCALE;
    let robust_threshold = center + OUTLIER_MADS * normalized_mad;

    let (threshold, reason) = match config.custom_threshold_days {
        Some(custom) => (
            custom,
            ExclusionReason::CustomThreshold {
                threshold_days: custom,
            },
        ),
        None => (
            robust_threshold,
            ExclusionReason::RobustOutlier {
                threshold_days: robust_threshold,
            },
        ),
    };

    let exclusion_allowed = config.auto_exclude_outliers
        && (config.custom_threshold_days.is_some() || durations.len() >= MIN_SAMPLES_FOR_EXCLUSION);

    let (mut kept, mut dropped): (Vec<&LevelDuration>, Vec<&LevelDuration>) = if exclusion_allowed {
        durations.iter().partition(|d| d.days <= threshold)
    } else {
        (durations.iter().collect(), Vec::new())
    };

    if kept.is_empty() && !dropped.is_empty() {
        tracing::debug!("outlier fence excluded every level; keeping all durations");
        kept = durations.iter().collect();
        dropped.clear();
    }

    let included_days: Vec<f64> = kept.iter().map(|d| d.days).collect();
    let average = trimmed_mean(&included_days, TRIM_FRACTION);
    let sigma = std_dev(&included_days);
    let bands = PaceBands::from_average(average, sigma);

    let stats = RobustStats {
        sample_count: durations.len(),
        included_count: kept.len(),
        excluded_count: dropped.len(),
        median: center,
        mad,
        normalized_mad,
        outlier_threshold: threshold,
        average,
        included_median: median(&included_days),
        std_dev: sigma,
    };

    PaceAnalysis {
        stats,
        bands,
        included: kept
            .into_iter()
            .map(|d| ClassifiedLevel {
                duration: d.clone(),
                class: bands.classify(d.days),
            })
            .collect(),
        excluded: dropped
            .into_iter()
            .map(|d| ExcludedLevel {
                duration: d.clone(),
                reason,
            })
            .collect(),
    }
}
