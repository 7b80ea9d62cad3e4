use std::path::PathBuf;

/// Failures at the ingestion boundary. The analytics functions themselves are
/// total and never return these.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, InsightError>;
