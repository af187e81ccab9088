//! Output formatting module

mod json;
mod stylish;

use lintpool_diagnostic::{LintResult, RulesMeta};
use miette::Result;

use crate::cli::OutputFormat;

/// Renders `results` in `format`. Stylish output is empty when nothing
/// was reported.
pub fn format_results(
    results: &[LintResult],
    format: OutputFormat,
    rules_meta: &RulesMeta,
) -> Result<String> {
    match format {
        OutputFormat::Stylish => Ok(stylish::format_stylish(results)),
        OutputFormat::Json => json::format_json(results),
        OutputFormat::JsonWithMetadata => json::format_json_with_metadata(results, rules_meta),
    }
}
