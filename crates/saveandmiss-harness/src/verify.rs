//! Output comparison and verification.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::diff;
use crate::fixtures::{CaseSource, LabeledCase};

/// Result of verifying a single case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Sub-test label (`case_<i>`).
    pub case_name: String,
    /// Table the case came from.
    pub source: CaseSource,
    pub arg: String,
    pub num: i64,
    /// Whether the case passed.
    pub passed: bool,
    /// Expected output.
    pub expected: String,
    /// Actual output from the function under test.
    pub actual: String,
    /// Failure message if the case failed.
    pub message: Option<String>,
    /// Diff if the case failed.
    pub diff: Option<String>,
}

impl VerificationResult {
    /// Compare `actual` against the case's expectation, byte for byte.
    #[must_use]
    pub fn compare(function: &str, labeled: &LabeledCase, actual: String) -> Self {
        let case = &labeled.case;
        let passed = actual == case.want;
        let (message, diff) = if passed {
            (None, None)
        } else {
            (
                Some(failure_message(function, &case.arg, case.num, &actual, &case.want)),
                Some(diff::render_diff(&case.want, &actual)),
            )
        };
        Self {
            case_name: labeled.label(),
            source: labeled.source,
            arg: case.arg.clone(),
            num: case.num,
            passed,
            expected: case.want.clone(),
            actual,
            message,
            diff,
        }
    }
}

/// `Name("arg",num) = "got"; want "want"`, with strings quoted by [`quote`].
#[must_use]
pub fn failure_message(function: &str, arg: &str, num: i64, got: &str, want: &str) -> String {
    format!(
        "{function}({},{num}) = {}; want {}",
        quote(arg),
        quote(got),
        quote(want)
    )
}

/// Double-quote `s` using Go's `%q` escapes.
///
/// `\a \b \f \n \r \t \v`, backslash and quote get their short forms; other
/// non-printing characters become `\xNN` (ASCII), `\uNNNN` or `\UNNNNNNNN`.
/// Printability is approximated as "not a control, format, private-use or
/// non-ASCII space character".
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if is_printable(c) => out.push(c),
            c => {
                let cp = u32::from(c);
                let _ = if cp < 0x80 {
                    write!(out, "\\x{cp:02x}")
                } else if cp < 0x1_0000 {
                    write!(out, "\\u{cp:04x}")
                } else {
                    write!(out, "\\U{cp:08x}")
                };
            }
        }
    }
    out.push('"');
    out
}

fn is_printable(c: char) -> bool {
    if c.is_control() || (c.is_whitespace() && c != ' ') {
        return false;
    }
    !matches!(
        c,
        '\u{ad}'
            | '\u{600}'..='\u{605}'
            | '\u{200b}'..='\u{200f}'
            | '\u{202a}'..='\u{202e}'
            | '\u{2060}'..='\u{2064}'
            | '\u{e000}'..='\u{f8ff}'
            | '\u{feff}'
            | '\u{e0000}'..='\u{e007f}'
            | '\u{f0000}'..='\u{10ffff}'
    )
}

/// Aggregate verification summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationSummary {
    /// Total cases run.
    pub total: usize,
    /// Cases passed.
    pub passed: usize,
    /// Cases failed.
    pub failed: usize,
    /// Individual results.
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    /// Build a summary from a list of results.
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let failed = total - passed;
        Self {
            total,
            passed,
            failed,
            results,
        }
    }

    /// Returns true if all cases passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Failed results in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    /// One `label: message` line per failure.
    #[must_use]
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures()
            .map(|r| format!("{}: {}", r.case_name, r.message.as_deref().unwrap_or("failed")))
            .collect()
    }
}
