//! User-tunable analytics parameters.
//!
//! Settings are passed explicitly into each analysis; nothing here is global.
//! Every struct accepts partial camelCase JSON and fills gaps with defaults.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};
use crate::srs::{IncorrectPolicy, LadderPreset, SrsLadder};

pub const MAX_LESSONS_PER_DAY: u32 = 500;
pub const MAX_FORECAST_DAYS: u32 = 365;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    pub forecast: ForecastConfig,
    pub pace: PaceConfig,
    pub leech: LeechThresholds,
    pub leveling: LevelingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForecastConfig {
    pub lessons_per_day: u32,
    pub horizon_days: u32,
    pub week_start: Weekday,
    /// Learner's offset from UTC, used to cut calendar days
    pub utc_offset_minutes: i32,
    pub ladder: LadderPreset,
    /// Where an incorrect answer sends an item in the simulation
    pub incorrect_policy: IncorrectPolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lessons_per_day: 15,
            horizon_days: 30,
            week_start: Weekday::Mon,
            utc_offset_minutes: 0,
            ladder: LadderPreset::Standard,
            incorrect_policy: IncorrectPolicy::default(),
        }
    }
}

impl ForecastConfig {
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }

    /// The ladder preset with the configured incorrect-answer policy applied
    pub fn policy(&self) -> SrsLadder {
        self.ladder.ladder().with_incorrect_policy(self.incorrect_policy)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AveragingMethod {
    #[default]
    TrimmedMean,
    Median,
}

impl AveragingMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "trimmed_mean" | "mean" | "average" => Some(Self::TrimmedMean),
            "median" => Some(Self::Median),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaceConfig {
    pub averaging: AveragingMethod,
    pub auto_exclude_outliers: bool,
    /// Replaces the robust threshold when set
    pub custom_threshold_days: Option<f64>,
}

impl Default for PaceConfig {
    fn default() -> Self {
        Self {
            averaging: AveragingMethod::TrimmedMean,
            auto_exclude_outliers: true,
            custom_threshold_days: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeechThresholds {
    pub min_reviews: u32,
    /// Inclusive upper bound on accuracy percent
    pub max_accuracy: f64,
    pub include_burned: bool,
}

impl Default for LeechThresholds {
    fn default() -> Self {
        Self {
            min_reviews: 10,
            max_accuracy: 75.0,
            include_burned: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelingConfig {
    pub include_vocabulary: bool,
}

impl AnalyticsConfig {
    /// Read overrides from `SRS_*` variables; missing or unparsable values keep
    /// their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_parse::<u32>("SRS_LESSONS_PER_DAY") {
            config.forecast.lessons_per_day = v;
        }
        if let Some(v) = env_parse::<u32>("SRS_FORECAST_DAYS") {
            config.forecast.horizon_days = v;
        }
        if let Some(v) = env_parse::<Weekday>("SRS_WEEK_START") {
            config.forecast.week_start = v;
        }
        if let Some(v) = env_parse::<i32>("SRS_UTC_OFFSET_MINUTES") {
            config.forecast.utc_offset_minutes = v;
        }
        if let Some(v) = env_string("SRS_LADDER").and_then(|s| LadderPreset::parse(&s)) {
            config.forecast.ladder = v;
        }
        if let Some(v) = env_string("SRS_INCORRECT_POLICY").and_then(|s| IncorrectPolicy::parse(&s)) {
            config.forecast.incorrect_policy = v;
        }
        if let Some(v) = env_string("SRS_PACE_METHOD").and_then(|s| AveragingMethod::parse(&s)) {
            config.pace.averaging = v;
        }
        if let Some(v) = env_bool("SRS_EXCLUDE_OUTLIERS") {
            config.pace.auto_exclude_outliers = v;
        }
        if let Some(v) = env_parse::<f64>("SRS_OUTLIER_THRESHOLD_DAYS") {
            config.pace.custom_threshold_days = Some(v);
        }
        if let Some(v) = env_parse::<u32>("SRS_LEECH_MIN_REVIEWS") {
            config.leech.min_reviews = v;
        }
        if let Some(v) = env_parse::<f64>("SRS_LEECH_MAX_ACCURACY") {
            config.leech.max_accuracy = v;
        }
        if let Some(v) = env_bool("SRS_LEECH_INCLUDE_BURNED") {
            config.leech.include_burned = v;
        }
        if let Some(v) = env_bool("SRS_INCLUDE_VOCABULARY") {
            config.leveling.include_vocabulary = v;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.forecast.lessons_per_day > MAX_LESSONS_PER_DAY {
            return Err(InsightError::InvalidConfig(format!(
                "lessonsPerDay must be at most {MAX_LESSONS_PER_DAY}, got {}",
                self.forecast.lessons_per_day
            )));
        }
        if !(1..=MAX_FORECAST_DAYS).contains(&self.forecast.horizon_days) {
            return Err(InsightError::InvalidConfig(format!(
                "horizonDays must be within 1..={MAX_FORECAST_DAYS}, got {}",
                self.forecast.horizon_days
            )));
        }
        if let IncorrectPolicy::ResetTo { stage } = self.forecast.incorrect_policy {
            if !stage.is_active() {
                return Err(InsightError::InvalidConfig(format!(
                    "incorrectPolicy resetTo stage must be within 1..=8, got {}",
                    stage.value()
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.leech.max_accuracy) {
            return Err(InsightError::InvalidConfig(format!(
                "leech maxAccuracy must be within 0..=100, got {}",
                self.leech.max_accuracy
            )));
        }
        if let Some(threshold) = self.pace.custom_threshold_days {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(InsightError::InvalidConfig(format!(
                    "customThresholdDays must be a non-negative number, got {threshold}"
                )));
            }
        }
        Ok(())
    }
}

/// Settings for the command-line driver
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub snapshot_path: Option<PathBuf>,
    pub learner_id: String,
    pub log_level: String,
}

impl RunnerConfig {
    /// `cli_path` wins over `SRS_SNAPSHOT_PATH`
    pub fn from_env(cli_path: Option<String>) -> Self {
        let snapshot_path = cli_path
            .filter(|p| !p.trim().is_empty())
            .or_else(|| env_string("SRS_SNAPSHOT_PATH"))
            .map(PathBuf::from);
        let learner_id = env_string("SRS_LEARNER_ID").unwrap_or_else(|| "learner".to_string());
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            snapshot_path,
            learner_id,
            log_level,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|value| value.trim().parse::<T>().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    env_string(key).map(|v| v == "true" || v == "1")
}
