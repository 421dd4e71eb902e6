//! Report generation for harness runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::HarnessConfig;
use crate::fixtures::FixtureDigest;
use crate::verify::VerificationSummary;

/// Inputs the run was configured with, echoed into the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInputs {
    pub cases_dir: String,
    pub hidden_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Vec<String>>,
}

impl From<&HarnessConfig> for ReportInputs {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            cases_dir: config.cases_dir.display().to_string(),
            hidden_path: config.hidden_path.display().to_string(),
            selection: config.selection.clone(),
        }
    }
}

/// A run report combining fixture provenance and verification results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Report title.
    pub title: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    pub inputs: ReportInputs,
    /// One entry per case table actually read.
    pub fixtures: Vec<FixtureDigest>,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl RunReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Cases dir: {}\n", self.inputs.cases_dir));
        out.push_str(&format!("- Hidden path: {}\n", self.inputs.hidden_path));
        if let Some(selection) = &self.inputs.selection {
            out.push_str(&format!("- Selection: {}\n", selection.join(", ")));
        }
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("## Fixtures\n\n");
        out.push_str("| Source | Path | Cases | SHA-256 |\n");
        out.push_str("|--------|------|-------|---------|\n");
        for f in &self.fixtures {
            out.push_str(&format!(
                "| {} | {} | {} | `{}` |\n",
                f.source.as_str(),
                f.path,
                f.cases,
                f.sha256
            ));
        }

        out.push_str("\n## Cases\n\n");
        out.push_str("| Case | Source | Status |\n");
        out.push_str("|------|--------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                r.case_name,
                r.source.as_str(),
                status
            ));
        }

        let failures: Vec<_> = self.summary.failures().collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n");
            for r in failures {
                out.push_str(&format!("\n### {}\n\n", r.case_name));
                if let Some(message) = &r.message {
                    out.push_str(&format!("{message}\n"));
                }
                if let Some(diff) = &r.diff {
                    out.push_str(&format!("\n```diff\n{diff}```\n"));
                }
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    /// Write markdown to `path` and JSON beside it with a `.json` extension.
    ///
    /// A `path` that already ends in `.json` gets the JSON, and the markdown
    /// goes to the same stem with `.md`. Returns both paths written.
    pub fn write(&self, path: &Path) -> std::io::Result<Vec<String>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let (md_path, json_path) = report_paths(path);
        std::fs::write(&md_path, self.to_markdown())?;
        std::fs::write(&json_path, self.to_json())?;
        Ok(vec![
            md_path.display().to_string(),
            json_path.display().to_string(),
        ])
    }
}

fn report_paths(path: &Path) -> (PathBuf, PathBuf) {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        (path.with_extension("md"), path.to_path_buf())
    } else {
        (path.to_path_buf(), path.with_extension("json"))
    }
}
