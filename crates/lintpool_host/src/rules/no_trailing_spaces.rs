//! `no-trailing-spaces`: disallow whitespace at the end of lines.

use lintpool_diagnostic::{Fix, FixableKind, RuleMeta, RuleType, Span};
use serde_json::Value;

use super::{Report, Rule, RuleContext, RuleFailure};
use crate::source::{CommentKind, TokenKind};

pub struct NoTrailingSpaces;

impl Rule for NoTrailingSpaces {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new(RuleType::Layout, "Disallow trailing whitespace at the end of lines")
            .fixable(FixableKind::Whitespace)
    }

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let skip_blank_lines = context
            .object_option("skipBlankLines")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let ignore_comments = context
            .object_option("ignoreComments")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let source = context.source;
        let text = source.text();

        let templates: Vec<Span> = source
            .tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Template)
            .map(|t| t.span)
            .collect();
        let comments: Vec<(CommentKind, Span)> =
            source.comments.iter().map(|c| (c.kind, c.span)).collect();

        let mut reports = Vec::new();
        let mut line_start = 0usize;
        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            let trimmed = content.trim_end_matches([' ', '\t', '\u{a0}', '\u{feff}', '\u{3000}']);
            let start = (line_start + trimmed.len()) as u32;
            let end = (line_start + content.len()) as u32;
            line_start += line.len();

            if start == end {
                continue;
            }
            if skip_blank_lines && trimmed.is_empty() {
                continue;
            }
            let inside = |span: &Span| span.start < start && end <= span.end;
            if templates.iter().any(inside) {
                continue;
            }
            let in_block_comment = |(kind, span): &(CommentKind, Span)| {
                *kind == CommentKind::Block && span.start < start && end < span.end
            };
            if comments.iter().any(in_block_comment) {
                continue;
            }
            if ignore_comments
                && comments
                    .iter()
                    .any(|(_, span)| span.start < start && start <= span.end)
            {
                continue;
            }

            let span = Span::new(start, end);
            reports.push(
                Report::new(span, "Trailing spaces not allowed.")
                    .with_message_id("trailingSpace")
                    .with_fix(Fix::delete(span)),
            );
        }

        for report in reports {
            context.report(report);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply, run};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_reports_and_fixes_trailing_spaces() {
        let text = "var a = 1;  \nvar b = 2;\t\r\n";
        let reports = run(&NoTrailingSpaces, text, &[]);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].span, Span::new(10, 12));
        assert_eq!(apply(text, &reports), "var a = 1;\nvar b = 2;\r\n");
    }

    #[test]
    fn test_skip_blank_lines() {
        let text = "a();\n   \nb();\n";
        assert_eq!(run(&NoTrailingSpaces, text, &[]).len(), 1);
        let options = [json!({ "skipBlankLines": true })];
        assert!(run(&NoTrailingSpaces, text, &options).is_empty());
    }

    #[test]
    fn test_template_lines_are_ignored() {
        let text = "const s = `a  \nb`;\n";
        assert!(run(&NoTrailingSpaces, text, &[]).is_empty());
    }

    #[test]
    fn test_ignore_comments() {
        let text = "a(); // note  \n";
        assert_eq!(run(&NoTrailingSpaces, text, &[]).len(), 1);
        let options = [json!({ "ignoreComments": true })];
        assert!(run(&NoTrailingSpaces, text, &options).is_empty());
    }
}
