//! Run configuration resolved once from the environment.
//!
//! The loader and runner never read the environment themselves; they receive
//! a [`HarnessConfig`] built here.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Directory holding the visible case file when `CASES_DIR` is unset or empty.
pub const DEFAULT_CASES_DIR: &str = "tests/cases";
/// File name of the visible case table inside the cases directory.
pub const VISIBLE_CASES_FILE: &str = "saveandmiss.json";
/// Fixed location of the held-out case table.
pub const HIDDEN_CASES_PATH: &str = "tests/hidden/saveandmiss_hidden.json";

/// Environment variable naming the visible cases directory.
pub const ENV_CASES_DIR: &str = "CASES_DIR";
/// Environment variable holding a comma-separated label selection.
pub const ENV_CASES_RUN: &str = "CASES_RUN";
/// Environment variable naming the markdown report output path.
pub const ENV_CASES_REPORT: &str = "CASES_REPORT";
/// Environment variable naming the JSONL log output path.
pub const ENV_CASES_LOG: &str = "CASES_LOG";

/// Everything a harness run needs to know about its inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory containing the visible case file.
    pub cases_dir: PathBuf,
    /// Path of the optional hidden case file.
    pub hidden_path: PathBuf,
    /// Labels to run; `None` runs every case.
    pub selection: Option<Vec<String>>,
    /// Markdown report path; the JSON twin is written beside it.
    pub report_path: Option<PathBuf>,
    /// JSONL log path; logs stay in memory when unset.
    pub log_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cases_dir: PathBuf::from(DEFAULT_CASES_DIR),
            hidden_path: PathBuf::from(HIDDEN_CASES_PATH),
            selection: None,
            report_path: None,
            log_path: None,
        }
    }
}

impl HarnessConfig {
    /// Resolve the configuration from the process environment.
    ///
    /// Values are read as OS strings so non-UTF-8 paths survive intact.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key: &str| std::env::var_os(key))
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated exactly like unset ones.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            cases_dir: resolve_cases_dir(non_empty(ENV_CASES_DIR)),
            hidden_path: PathBuf::from(HIDDEN_CASES_PATH),
            selection: non_empty(ENV_CASES_RUN)
                .and_then(|raw| parse_selection(&raw.to_string_lossy())),
            report_path: non_empty(ENV_CASES_REPORT).map(PathBuf::from),
            log_path: non_empty(ENV_CASES_LOG).map(PathBuf::from),
        }
    }

    /// Override the visible cases directory.
    #[must_use]
    pub fn with_cases_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cases_dir = dir.into();
        self
    }

    /// Override the hidden case file location.
    #[must_use]
    pub fn with_hidden_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hidden_path = path.into();
        self
    }

    /// Restrict the run to the given labels.
    #[must_use]
    pub fn with_selection<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        self.selection = if labels.is_empty() {
            None
        } else {
            Some(labels)
        };
        self
    }

    /// Write a markdown + JSON report at the end of the run.
    #[must_use]
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Write the structured log to a file.
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Full path of the visible case file.
    #[must_use]
    pub fn visible_path(&self) -> PathBuf {
        self.cases_dir.join(VISIBLE_CASES_FILE)
    }
}

/// Pick the visible cases directory, falling back to [`DEFAULT_CASES_DIR`].
#[must_use]
pub fn resolve_cases_dir(raw: Option<OsString>) -> PathBuf {
    match raw {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => Path::new(DEFAULT_CASES_DIR).to_path_buf(),
    }
}

fn parse_selection(raw: &str) -> Option<Vec<String>> {
    let labels: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(String::from)
        .collect();
    if labels.is_empty() { None } else { Some(labels) }
}
