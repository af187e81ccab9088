//! Human-readable output grouped by file

use std::fmt::Write;

use lintpool_diagnostic::{LintResult, LintSummary, Severity};

pub fn format_stylish(results: &[LintResult]) -> String {
    let mut output = String::new();

    for result in results.iter().filter(|r| r.has_messages()) {
        let rows: Vec<[String; 4]> = result
            .messages
            .iter()
            .map(|message| {
                let severity = match message.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                [
                    format!("{}:{}", message.line, message.column),
                    severity.to_string(),
                    strip_final_period(&message.message).to_string(),
                    message.rule_id.clone().unwrap_or_default(),
                ]
            })
            .collect();
        let widths: Vec<usize> = (0..3)
            .map(|column| rows.iter().map(|row| row[column].len()).max().unwrap_or(0))
            .collect();

        let _ = writeln!(output, "\n{}", result.file_path.display());
        for row in &rows {
            let line = format!(
                "  {:>w0$}  {:<w1$}  {:<w2$}  {}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
            );
            let _ = writeln!(output, "{}", line.trim_end());
        }
    }

    let summary = LintSummary::from_results(results);
    let total = summary.error_count + summary.warning_count;
    if total == 0 {
        return output;
    }

    let _ = writeln!(
        output,
        "\n\u{2716} {} {} ({} {}, {} {})",
        total,
        plural(total, "problem"),
        summary.error_count,
        plural(summary.error_count, "error"),
        summary.warning_count,
        plural(summary.warning_count, "warning"),
    );
    if summary.fixable_error_count > 0 || summary.fixable_warning_count > 0 {
        let _ = writeln!(
            output,
            "  {} {} and {} {} potentially fixable with the `--fix` option.",
            summary.fixable_error_count,
            plural(summary.fixable_error_count, "error"),
            summary.fixable_warning_count,
            plural(summary.fixable_warning_count, "warning"),
        );
    }
    output
}

/// "Missing semicolon." is shown as "Missing semicolon".
fn strip_final_period(message: &str) -> &str {
    match message.strip_suffix('.') {
        Some(stripped) if !stripped.ends_with(' ') => stripped,
        _ => message,
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
