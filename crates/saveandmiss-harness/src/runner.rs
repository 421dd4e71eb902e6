//! Test execution engine.

use crate::fixtures::CaseCollection;
use crate::verify::VerificationResult;

/// Name the function under test is reported under.
pub const FUNCTION_NAME: &str = "SaveAndMiss";

/// Runs a case collection against a function and collects verification results.
pub struct TestRunner {
    /// Name used in failure messages.
    pub function: String,
    /// Labels to execute; `None` executes everything.
    pub selection: Option<Vec<String>>,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new(FUNCTION_NAME)
    }
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            selection: None,
        }
    }

    /// Only run cases whose label is in `selection`.
    #[must_use]
    pub fn with_selection(mut self, selection: Option<Vec<String>>) -> Self {
        self.selection = selection;
        self
    }

    /// Run every selected case once, in collection order.
    ///
    /// A mismatch is recorded and the run moves on; no case can stop another
    /// from executing.
    pub fn run<F>(&self, collection: &CaseCollection, function: F) -> Vec<VerificationResult>
    where
        F: Fn(&str, i64) -> String,
    {
        collection
            .iter()
            .filter(|labeled| self.selects(&labeled.label()))
            .map(|labeled| {
                let actual = function(&labeled.case.arg, labeled.case.num);
                VerificationResult::compare(&self.function, &labeled, actual)
            })
            .collect()
    }

    fn selects(&self, label: &str) -> bool {
        self.selection
            .as_ref()
            .is_none_or(|labels| labels.iter().any(|l| l == label))
    }
}
