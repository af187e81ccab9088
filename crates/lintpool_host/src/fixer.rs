//! Applying message fixes to source text.

use std::fs;
use std::path::Path;

use lintpool_diagnostic::{Fix, LintMessage};
use tracing::{debug, warn};

use crate::HostError;

/// Result of applying one pass of fixes.
#[derive(Debug)]
pub struct FixerResult {
    /// Number of fixes applied.
    pub fixes_applied: usize,
    /// The fixed content.
    pub fixed_content: String,
    /// Whether the content was modified.
    pub modified: bool,
}

impl FixerResult {
    pub fn new(fixes_applied: usize, fixed_content: String, modified: bool) -> Self {
        Self {
            fixes_applied,
            fixed_content,
            modified,
        }
    }

    /// Creates a result indicating no changes were made.
    pub fn unchanged(content: String) -> Self {
        Self {
            fixes_applied: 0,
            fixed_content: content,
            modified: false,
        }
    }
}

/// Applies the fixes carried by `messages`.
///
/// Fixes are applied from the end of the text to the beginning so earlier
/// offsets stay valid. Overlapping fixes are skipped and picked up by a
/// later pass.
pub fn apply_fixes_to_content(content: &str, messages: &[&LintMessage]) -> FixerResult {
    let mut fixes: Vec<&Fix> = messages.iter().filter_map(|m| m.fix.as_ref()).collect();

    if fixes.is_empty() {
        return FixerResult::unchanged(content.to_string());
    }

    fixes.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let fixes = filter_overlapping_fixes(fixes);

    let mut result = content.to_string();
    let mut applied = 0;

    for fix in &fixes {
        let start = fix.range.start as usize;
        let end = fix.range.end as usize;

        if start > result.len()
            || end > result.len()
            || start > end
            || !result.is_char_boundary(start)
            || !result.is_char_boundary(end)
        {
            warn!(
                "Invalid fix range: start={}, end={}, content_len={}",
                start,
                end,
                result.len()
            );
            continue;
        }

        debug!("Applying fix: replace [{}..{}] with '{}'", start, end, fix.text);

        result.replace_range(start..end, &fix.text);
        applied += 1;
    }

    let modified = result != content;
    FixerResult::new(applied, result, modified)
}

/// Filters out overlapping fixes, keeping the one that starts later.
///
/// `fixes` must be sorted by start, descending.
pub(crate) fn filter_overlapping_fixes(fixes: Vec<&Fix>) -> Vec<&Fix> {
    if fixes.len() <= 1 {
        return fixes;
    }

    #[cfg(debug_assertions)]
    {
        for window in fixes.windows(2) {
            debug_assert!(
                window[0].range.start >= window[1].range.start,
                "Fixes must be sorted by start descending for filter_overlapping_fixes"
            );
        }
    }

    let mut result: Vec<&Fix> = Vec::with_capacity(fixes.len());

    for fix in fixes {
        // Accepted fixes are sorted descending too, so only the last one can
        // overlap the candidate. Two inserts at one offset also conflict.
        let overlaps = result.last().is_some_and(|last| {
            fix.range.overlaps(&last.range)
                || (fix.range.start == last.range.start && fix.range.is_empty())
        });

        if overlaps {
            warn!(
                "Skipping overlapping fix at [{}, {}]",
                fix.range.start, fix.range.end
            );
        } else {
            result.push(fix);
        }
    }

    result
}

/// Writes fixed output over `path`.
pub fn write_fixed_output(path: &Path, output: &str) -> Result<(), HostError> {
    fs::write(path, output)
        .map_err(|e| HostError::file(format!("Failed to write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintpool_diagnostic::{Severity, Span};
    use pretty_assertions::assert_eq;

    fn with_fix(start: u32, end: u32, replacement: &str) -> LintMessage {
        LintMessage::new("test-rule", Severity::Error, "Test message", 1, 1)
            .with_fix(Fix::new(Span::new(start, end), replacement))
    }

    fn without_fix() -> LintMessage {
        LintMessage::new("test-rule", Severity::Error, "Test message", 1, 1)
    }

    #[test]
    fn apply_single_fix() {
        let message = with_fix(0, 5, "Hi");
        let result = apply_fixes_to_content("Hello World", &[&message]);

        assert_eq!(result.fixed_content, "Hi World");
        assert_eq!(result.fixes_applied, 1);
        assert!(result.modified);
    }

    #[test]
    fn apply_insert_and_delete() {
        let insert = with_fix(9, 9, ";");
        let delete = with_fix(10, 11, "");
        let result = apply_fixes_to_content("var x = 1\n;", &[&insert, &delete]);

        assert_eq!(result.fixed_content, "var x = 1;\n");
        assert_eq!(result.fixes_applied, 2);
    }

    #[test]
    fn no_fixes_returns_unchanged() {
        let message = without_fix();
        let result = apply_fixes_to_content("Hello World", &[&message]);

        assert_eq!(result.fixed_content, "Hello World");
        assert_eq!(result.fixes_applied, 0);
        assert!(!result.modified);
    }

    #[test]
    fn overlapping_fixes_are_filtered() {
        let first = with_fix(0, 5, "Hi");
        let second = with_fix(3, 8, "XXX");
        let result = apply_fixes_to_content("Hello World", &[&first, &second]);

        assert_eq!(result.fixes_applied, 1);
        assert_eq!(result.fixed_content, "HelXXXrld");
    }

    #[test]
    fn inserts_at_same_offset_conflict() {
        let first = with_fix(9, 9, ";");
        let second = with_fix(9, 9, ";");
        let result = apply_fixes_to_content("var x = 1", &[&first, &second]);

        assert_eq!(result.fixed_content, "var x = 1;");
        assert_eq!(result.fixes_applied, 1);
    }

    #[test]
    fn invalid_range_is_skipped() {
        let message = with_fix(0, 100, "Hi");
        let result = apply_fixes_to_content("Hello", &[&message]);

        assert_eq!(result.fixed_content, "Hello");
        assert_eq!(result.fixes_applied, 0);
    }

    #[test]
    fn filter_overlapping_fixes_keeps_disjoint() {
        let f1 = Fix::new(Span::new(10, 15), "f1");
        let f2 = Fix::new(Span::new(0, 5), "f2");

        let result = filter_overlapping_fixes(vec![&f1, &f2]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "f1");
        assert_eq!(result[1].text, "f2");
    }

    #[test]
    fn write_fixed_output_replaces_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("a.js");
        fs::write(&path, "var x = 1").unwrap();

        write_fixed_output(&path, "var x = 1;").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "var x = 1;");
    }
}
