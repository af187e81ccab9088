//! Per-file lint results.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{LintMessage, Severity, SuppressedMessage};

/// A deprecated rule that was enabled while linting a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedDeprecatedRule {
    pub rule_id: String,
    pub replaced_by: Vec<String>,
}

/// Timing information collected with `--stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintStats {
    /// Number of passes that applied fixes.
    pub fix_passes: u32,
    /// Accumulated time per rule, in milliseconds.
    pub rule_times: BTreeMap<String, f64>,
}

/// Everything produced for a single file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintResult {
    pub file_path: PathBuf,
    pub messages: Vec<LintMessage>,
    #[serde(default)]
    pub suppressed_messages: Vec<SuppressedMessage>,
    pub error_count: usize,
    pub fatal_error_count: usize,
    pub warning_count: usize,
    pub fixable_error_count: usize,
    pub fixable_warning_count: usize,
    /// Fixed source text, present only when fixes changed the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Original source text, kept for formatters when no output exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub used_deprecated_rules: Vec<UsedDeprecatedRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<LintStats>,
}

impl LintResult {
    /// Creates an empty result for `file_path`.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }

    /// Creates a result with `messages` and consistent counters.
    pub fn with_messages(file_path: impl Into<PathBuf>, messages: Vec<LintMessage>) -> Self {
        let mut result = Self::new(file_path);
        result.messages = messages;
        result.recount();
        result
    }

    /// Recomputes every counter from `messages`.
    ///
    /// Must be called after messages are moved in or out of `messages`.
    pub fn recount(&mut self) {
        let mut error_count = 0;
        let mut fatal_error_count = 0;
        let mut warning_count = 0;
        let mut fixable_error_count = 0;
        let mut fixable_warning_count = 0;

        for message in &self.messages {
            match message.severity {
                Severity::Error => {
                    error_count += 1;
                    if message.fatal {
                        fatal_error_count += 1;
                    }
                    if message.fix.is_some() {
                        fixable_error_count += 1;
                    }
                }
                Severity::Warning => {
                    warning_count += 1;
                    if message.fix.is_some() {
                        fixable_warning_count += 1;
                    }
                }
            }
        }

        self.error_count = error_count;
        self.fatal_error_count = fatal_error_count;
        self.warning_count = warning_count;
        self.fixable_error_count = fixable_error_count;
        self.fixable_warning_count = fixable_warning_count;
    }

    /// Returns true if any message remains.
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }
}

/// Totals across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintSummary {
    pub file_count: usize,
    pub error_count: usize,
    pub fatal_error_count: usize,
    pub warning_count: usize,
    pub fixable_error_count: usize,
    pub fixable_warning_count: usize,
    pub suppressed_count: usize,
}

impl LintSummary {
    pub fn from_results(results: &[LintResult]) -> Self {
        results.iter().fold(
            Self {
                file_count: results.len(),
                ..Self::default()
            },
            |mut acc, result| {
                acc.error_count += result.error_count;
                acc.fatal_error_count += result.fatal_error_count;
                acc.warning_count += result.warning_count;
                acc.fixable_error_count += result.fixable_error_count;
                acc.fixable_warning_count += result.fixable_warning_count;
                acc.suppressed_count += result.suppressed_messages.len();
                acc
            },
        )
    }

    pub fn problem_count(&self) -> usize {
        self.error_count + self.warning_count
    }
}
