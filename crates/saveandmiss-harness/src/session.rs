//! One complete harness run: load fixtures, execute, log, report.

use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;

use crate::config::HarnessConfig;
use crate::fixtures::{CaseCollection, FixtureError, load_collection};
use crate::report::{ReportInputs, RunReport};
use crate::runner::{FUNCTION_NAME, TestRunner};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, now_utc};
use crate::verify::{VerificationResult, VerificationSummary};

/// Suite name used for trace ids and report titles.
pub const SUITE: &str = "saveandmiss";

/// Conditions that abort a run before or after case execution.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error("log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Load the configured fixtures and verify `function` against them.
///
/// Fixture errors abort the run; case mismatches are returned in the report's
/// summary.
pub fn run_with_config<F>(config: &HarnessConfig, function: F) -> Result<RunReport, HarnessError>
where
    F: Fn(&str, i64) -> String,
{
    let started = Instant::now();
    let mut log = SessionLog::open(config)?;

    let collection = match load_collection(config) {
        Ok(collection) => collection,
        Err(err) => {
            log.emit(
                LogEntry::new("", LogLevel::Fatal, "fixtures_invalid")
                    .with_symbol(FUNCTION_NAME)
                    .with_outcome(Outcome::Error)
                    .with_details(serde_json::json!({ "error": err.to_string() })),
            )?;
            log.flush()?;
            return Err(err.into());
        }
    };
    log.emit(fixtures_loaded(&collection))?;

    let runner = TestRunner::new(FUNCTION_NAME).with_selection(config.selection.clone());
    let results = runner.run(&collection, function);
    for result in &results {
        log.emit(case_result(result))?;
    }

    let report = RunReport {
        title: String::from("SaveAndMiss Fixture Report"),
        timestamp: now_utc(),
        inputs: ReportInputs::from(config),
        fixtures: collection.digests().to_vec(),
        summary: VerificationSummary::from_results(results),
    };

    let artifacts = match &config.report_path {
        Some(path) => report.write(path).map_err(|source| HarnessError::Report {
            path: path.clone(),
            source,
        })?,
        None => Vec::new(),
    };

    let summary = &report.summary;
    let level = if summary.all_passed() {
        LogLevel::Info
    } else {
        LogLevel::Error
    };
    let outcome = if summary.all_passed() {
        Outcome::Pass
    } else {
        Outcome::Fail
    };
    log.emit(
        LogEntry::new("", level, "run_complete")
            .with_symbol(FUNCTION_NAME)
            .with_outcome(outcome)
            .with_duration_ms(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX))
            .with_artifacts(artifacts)
            .with_details(serde_json::json!({
                "total": summary.total,
                "passed": summary.passed,
                "failed": summary.failed,
            })),
    )?;
    log.flush()?;

    Ok(report)
}

/// Same as [`run_with_config`] with the configuration read from the environment.
pub fn run_from_env<F>(function: F) -> Result<RunReport, HarnessError>
where
    F: Fn(&str, i64) -> String,
{
    run_with_config(&HarnessConfig::from_env(), function)
}

fn fixtures_loaded(collection: &CaseCollection) -> LogEntry {
    LogEntry::new("", LogLevel::Info, "fixtures_loaded")
        .with_symbol(FUNCTION_NAME)
        .with_artifacts(collection.digests().iter().map(|d| d.path.clone()).collect())
        .with_details(serde_json::json!({
            "visible": collection.visible_len(),
            "hidden": collection.hidden_len(),
            "total": collection.len(),
        }))
}

fn case_result(result: &VerificationResult) -> LogEntry {
    let entry = LogEntry::new(
        "",
        if result.passed {
            LogLevel::Info
        } else {
            LogLevel::Error
        },
        "case_result",
    )
    .with_symbol(FUNCTION_NAME)
    .with_case(&result.case_name);

    if result.passed {
        entry.with_outcome(Outcome::Pass)
    } else {
        entry.with_outcome(Outcome::Fail).with_details(serde_json::json!({
            "source": result.source,
            "arg": result.arg,
            "num": result.num,
            "got": result.actual,
            "want": result.expected,
            "message": result.message,
        }))
    }
}

/// Log sink for a single run. Write failures carry the log path.
struct SessionLog {
    emitter: LogEmitter,
    path: PathBuf,
}

impl SessionLog {
    fn open(config: &HarnessConfig) -> Result<Self, HarnessError> {
        let run_id = run_id();
        match &config.log_path {
            Some(path) => {
                let emitter =
                    LogEmitter::to_file(path, SUITE, &run_id).map_err(|source| {
                        HarnessError::Log {
                            path: path.clone(),
                            source,
                        }
                    })?;
                Ok(Self {
                    emitter,
                    path: path.clone(),
                })
            }
            None => Ok(Self {
                emitter: LogEmitter::to_buffer(SUITE, &run_id),
                path: PathBuf::from("<memory>"),
            }),
        }
    }

    fn emit(&mut self, entry: LogEntry) -> Result<(), HarnessError> {
        self.emitter.emit_entry(entry).map_err(|source| HarnessError::Log {
            path: self.path.clone(),
            source,
        })
    }

    fn flush(&mut self) -> Result<(), HarnessError> {
        self.emitter.flush().map_err(|source| HarnessError::Log {
            path: self.path.clone(),
            source,
        })
    }
}

fn run_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("run-{}-{nanos}", std::process::id())
}
