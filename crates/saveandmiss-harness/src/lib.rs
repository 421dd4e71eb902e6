//! Fixture harness for `SaveAndMiss`.
//!
//! This crate provides:
//! - Configuration: resolve the visible cases directory and optional outputs once
//! - Fixture loading: visible table plus an optional hidden table, merged in order
//! - Verification: run the function under test per case, exact string comparison
//! - Report generation: human-readable + machine-readable run reports
//! - Structured logging: JSONL records for every run

#![forbid(unsafe_code)]

pub mod config;
pub mod diff;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod session;
pub mod structured_log;
pub mod verify;

pub use config::HarnessConfig;
pub use fixtures::{Case, CaseCollection, CaseSource, FixtureError};
pub use report::RunReport;
pub use runner::TestRunner;
pub use session::{HarnessError, run_from_env, run_with_config};
pub use verify::{VerificationResult, VerificationSummary};
