use std::io::Read;
use std::process::ExitCode;

use chrono::Utc;

use srs_insight::config::{AnalyticsConfig, RunnerConfig};
use srs_insight::error::{InsightError, Result};
use srs_insight::logging::init_tracing;
use srs_insight::report::{analyze, load_snapshot};
use srs_insight::types::Snapshot;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let runner = RunnerConfig::from_env(std::env::args().nth(1));
    let _log_guard = init_tracing(&runner.log_level);

    match run(&runner) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "analysis failed");
            ExitCode::FAILURE
        }
    }
}

fn run(runner: &RunnerConfig) -> Result<()> {
    let config = AnalyticsConfig::from_env();
    config.validate()?;

    let snapshot = match &runner.snapshot_path {
        Some(path) => load_snapshot(path)?,
        None => read_stdin()?,
    };

    let report = analyze(&snapshot, &config, &runner.learner_id, Utc::now());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_stdin() -> Result<Snapshot> {
    tracing::info!("no snapshot path given, reading stdin");
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .map_err(|source| InsightError::Io {
            path: "<stdin>".into(),
            source,
        })?;
    Ok(serde_json::from_str(&raw)?)
}
