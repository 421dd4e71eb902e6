//! Structured JSONL logging for harness runs.
//!
//! Provides:
//! - [`LogEntry`]: canonical JSONL log record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file or an in-memory buffer.
//! - [`validate_log_line`]: validates a single JSONL line against the schema.
//! - [`validate_log_file`]: validates an entire JSONL file.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Case outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Error,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `trace_id`, `level`, `event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    /// Function under test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Sub-test label (`case_<i>`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_refs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create a new log entry with required fields only.
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            suite: None,
            symbol: None,
            case: None,
            outcome: None,
            duration_ms: None,
            artifact_refs: None,
            details: None,
        }
    }

    /// Set the suite name.
    #[must_use]
    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = Some(suite.into());
        self
    }

    /// Set the function under test.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Set the case label.
    #[must_use]
    pub fn with_case(mut self, label: impl Into<String>) -> Self {
        self.case = Some(label.into());
        self
    }

    /// Set the outcome.
    #[must_use]
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    /// Set duration in milliseconds.
    #[must_use]
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    /// Add artifact references.
    #[must_use]
    pub fn with_artifacts(mut self, refs: Vec<String>) -> Self {
        self.artifact_refs = Some(refs);
        self
    }

    /// Set free-form details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

// ---------------------------------------------------------------------------
// Log emitter
// ---------------------------------------------------------------------------

/// Writes structured JSONL log entries to a file or an in-memory buffer.
pub struct LogEmitter {
    writer: Box<dyn Write>,
    seq: u64,
    suite: String,
    run_id: String,
}

impl LogEmitter {
    /// Create an emitter that writes to a file, creating parent directories.
    pub fn to_file(path: &Path, suite: &str, run_id: &str) -> std::io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        Ok(Self {
            writer: Box::new(std::io::BufWriter::new(file)),
            seq: 0,
            suite: suite.to_string(),
            run_id: run_id.to_string(),
        })
    }

    /// Create an emitter whose output is kept in memory and dropped.
    #[must_use]
    pub fn to_buffer(suite: &str, run_id: &str) -> Self {
        Self {
            writer: Box::new(Vec::new()),
            seq: 0,
            suite: suite.to_string(),
            run_id: run_id.to_string(),
        }
    }

    /// Generate the next trace ID.
    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{}::{:03}", self.suite, self.run_id, self.seq)
    }

    /// Emit a fully-populated log entry.
    ///
    /// An empty `trace_id` gets the next sequence number; a missing suite gets
    /// the emitter's.
    pub fn emit_entry(&mut self, mut entry: LogEntry) -> std::io::Result<()> {
        if entry.trace_id.is_empty() {
            entry.trace_id = self.next_trace_id();
        }
        if entry.suite.is_none() {
            entry.suite = Some(self.suite.clone());
        }
        let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
        writeln!(self.writer, "{line}")
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validation error for a log line.
#[derive(Debug)]
pub struct LogValidationError {
    pub line_number: usize,
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for LogValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: field '{}': {}",
            self.line_number, self.field, self.message
        )
    }
}

/// Validate a single JSONL line against the schema.
///
/// Returns the decoded entry if valid, or a list of validation errors.
pub fn validate_log_line(
    line: &str,
    line_number: usize,
) -> Result<LogEntry, Vec<LogValidationError>> {
    let mut errors = Vec::new();
    let err = |field: &str, message: String| LogValidationError {
        line_number,
        field: field.to_string(),
        message,
    };

    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => return Err(vec![err("<json>", format!("invalid JSON: {e}"))]),
    };

    let Some(obj) = value.as_object() else {
        return Err(vec![err("<root>", "expected JSON object".to_string())]);
    };

    for field in ["timestamp", "trace_id", "level", "event"] {
        match obj.get(field) {
            None => errors.push(err(field, "required field missing".to_string())),
            Some(v) if !v.is_string() => errors.push(err(field, "expected string".to_string())),
            Some(_) => {}
        }
    }

    if let Some(trace_id) = obj.get("trace_id").and_then(|v| v.as_str()) {
        if trace_id.split("::").count() != 3 {
            errors.push(err(
                "trace_id",
                format!("expected <suite>::<run>::<seq>, got {trace_id:?}"),
            ));
        }
    }

    if let Some(level) = obj.get("level") {
        if level.is_string() && serde_json::from_value::<LogLevel>(level.clone()).is_err() {
            errors.push(err("level", format!("unknown level {level}")));
        }
    }

    if let Some(outcome) = obj.get("outcome") {
        if serde_json::from_value::<Outcome>(outcome.clone()).is_err() {
            errors.push(err("outcome", format!("unknown outcome {outcome}")));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(value).map_err(|e| vec![err("<entry>", e.to_string())])
}

/// Validate every non-empty line of a JSONL file.
///
/// Returns the number of valid lines, or every error found.
pub fn validate_log_file(path: &Path) -> Result<usize, Vec<LogValidationError>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        vec![LogValidationError {
            line_number: 0,
            field: "<file>".to_string(),
            message: format!("read {}: {e}", path.display()),
        }]
    })?;

    let mut valid = 0;
    let mut errors = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match validate_log_line(line, i + 1) {
            Ok(_) => valid += 1,
            Err(mut errs) => errors.append(&mut errs),
        }
    }
    if errors.is_empty() {
        Ok(valid)
    } else {
        Err(errors)
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn now_utc() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format_utc(duration.as_secs(), duration.subsec_millis())
}

fn format_utc(secs: u64, millis: u32) -> String {
    let days = secs / 86_400;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60,
    )
}

// Days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z % 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_serializes_required_fields() {
        let entry = LogEntry::new("saveandmiss::run-1::001", LogLevel::Info, "fixtures_loaded");
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["timestamp"].is_string());
        assert_eq!(parsed["trace_id"], "saveandmiss::run-1::001");
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["event"], "fixtures_loaded");
        // Optional fields should be absent
        assert!(parsed.get("suite").is_none());
        assert!(parsed.get("case").is_none());
        assert!(parsed.get("outcome").is_none());
    }

    #[test]
    fn log_entry_with_optional_fields() {
        let entry = LogEntry::new("saveandmiss::run-1::002", LogLevel::Error, "case_result")
            .with_suite("saveandmiss")
            .with_symbol("SaveAndMiss")
            .with_case("case_3")
            .with_outcome(Outcome::Fail)
            .with_duration_ms(2)
            .with_artifacts(vec!["target/report.md".to_string()])
            .with_details(serde_json::json!({"want": "abab"}));

        let parsed: serde_json::Value = serde_json::from_str(&serde_json::to_string(&entry).unwrap()).unwrap();
        assert_eq!(parsed["suite"], "saveandmiss");
        assert_eq!(parsed["symbol"], "SaveAndMiss");
        assert_eq!(parsed["case"], "case_3");
        assert_eq!(parsed["outcome"], "fail");
        assert_eq!(parsed["duration_ms"], 2);
        assert!(parsed["artifact_refs"].is_array());
        assert!(parsed["details"].is_object());
    }

    #[test]
    fn validate_valid_line() {
        let entry = LogEntry::new("saveandmiss::run-1::001", LogLevel::Info, "run_complete");
        let json = serde_json::to_string(&entry).unwrap();
        let result = validate_log_line(&json, 1);
        assert!(result.is_ok(), "Valid line should pass: {result:?}");
    }

    #[test]
    fn validate_missing_required_field() {
        let json = r#"{"timestamp":"2026-01-01T00:00:00Z","level":"info","event":"test"}"#;
        let errors = validate_log_line(json, 1).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "trace_id"));
    }

    #[test]
    fn validate_rejects_bad_enums_and_trace_ids() {
        let json = r#"{"timestamp":"t","trace_id":"nope","level":"loud","event":"e","outcome":"skip"}"#;
        let errors = validate_log_line(json, 7).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"trace_id"));
        assert!(fields.contains(&"level"));
        assert!(fields.contains(&"outcome"));
        assert!(errors.iter().all(|e| e.line_number == 7));
    }

    #[test]
    fn validate_rejects_non_objects() {
        assert_eq!(validate_log_line("[1]", 1).unwrap_err()[0].field, "<root>");
        assert_eq!(validate_log_line("{", 1).unwrap_err()[0].field, "<json>");
    }

    #[test]
    fn emitter_numbers_trace_ids() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir()
            .join(format!("sam-log-{}-{nanos}", std::process::id()))
            .join("run.jsonl");

        let mut emitter = LogEmitter::to_file(&path, "saveandmiss", "run-9").unwrap();
        emitter
            .emit_entry(LogEntry::new("", LogLevel::Info, "a"))
            .unwrap();
        emitter
            .emit_entry(LogEntry::new("", LogLevel::Info, "b").with_suite("other"))
            .unwrap();
        emitter
            .emit_entry(LogEntry::new("fixed::run::777", LogLevel::Info, "c"))
            .unwrap();
        emitter.flush().unwrap();
        drop(emitter);

        assert_eq!(validate_log_file(&path).unwrap(), 3);
        let content = std::fs::read_to_string(&path).unwrap();
        let entries: Vec<LogEntry> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries[0].trace_id, "saveandmiss::run-9::001");
        assert_eq!(entries[0].suite.as_deref(), Some("saveandmiss"));
        assert_eq!(entries[1].trace_id, "saveandmiss::run-9::002");
        assert_eq!(entries[1].suite.as_deref(), Some("other"));
        assert_eq!(entries[2].trace_id, "fixed::run::777");
    }

    #[test]
    fn utc_formatting_is_calendar_exact() {
        assert_eq!(format_utc(0, 0), "1970-01-01T00:00:00.000Z");
        // 2000-02-29T12:34:56Z
        assert_eq!(format_utc(951_827_696, 7), "2000-02-29T12:34:56.007Z");
        // 2026-10-18T00:00:00Z
        assert_eq!(format_utc(1_792_281_600, 0), "2026-10-18T00:00:00.000Z");
    }
}
