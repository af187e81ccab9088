//! Inline `eslint-disable-line` and `eslint-disable-next-line` comments.

use lintpool_diagnostic::{LintMessage, Severity, SuppressedMessage, SuppressionKind};

use crate::helpers::severity_from_level;
use crate::source::{CommentKind, SourceCode};

const DISABLE_LINE: &[&str] = &["eslint-disable-line", "lintpool-disable-line"];
const DISABLE_NEXT_LINE: &[&str] = &["eslint-disable-next-line", "lintpool-disable-next-line"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    DisableLine,
    DisableNextLine,
}

/// A parsed disable comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Directive name as written.
    pub name: String,
    /// Rules named by the comment. Empty means every rule.
    pub rule_ids: Vec<String>,
    /// Text after ` -- `.
    pub justification: Option<String>,
    /// Position of the comment.
    pub line: u32,
    pub column: u32,
    /// Line whose messages the directive suppresses.
    pub target_line: u32,
}

impl Directive {
    fn covers(&self, message: &LintMessage) -> Option<usize> {
        if message.fatal || message.line != self.target_line {
            return None;
        }
        if self.rule_ids.is_empty() {
            return Some(0);
        }
        let rule_id = message.rule_id.as_deref()?;
        self.rule_ids.iter().position(|id| id == rule_id)
    }
}

/// Collects directives from `source`. Malformed directives are returned as
/// error messages.
pub fn collect_directives(source: &SourceCode) -> (Vec<Directive>, Vec<LintMessage>) {
    let mut directives = Vec::new();
    let mut problems = Vec::new();

    for comment in &source.comments {
        let body = source.slice(comment.value).trim();
        let (head, justification) = match body.split_once(" --") {
            Some((head, rest)) => (head.trim(), Some(rest.trim_start_matches('-').trim())),
            None => (body, None),
        };
        let (name, rest) = match head.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest),
            None => (head, ""),
        };

        let kind = if DISABLE_LINE.contains(&name) {
            DirectiveKind::DisableLine
        } else if DISABLE_NEXT_LINE.contains(&name) {
            DirectiveKind::DisableNextLine
        } else {
            continue;
        };

        let (line, column) = source.line_col(comment.span.start);
        if kind == DirectiveKind::DisableLine
            && comment.kind == CommentKind::Block
            && comment.end_line != comment.line
        {
            problems.push(
                LintMessage::notice(
                    Severity::Error,
                    format!("{name} comment should not span multiple lines."),
                )
                .at(line, column),
            );
            continue;
        }

        let rule_ids = rest
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        directives.push(Directive {
            kind,
            name: name.to_string(),
            rule_ids,
            justification: justification
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            line,
            column,
            target_line: match kind {
                DirectiveKind::DisableLine => comment.line,
                DirectiveKind::DisableNextLine => comment.end_line + 1,
            },
        });
    }

    (directives, problems)
}

/// Messages left after applying directives.
#[derive(Debug, Default)]
pub struct DirectiveOutcome {
    pub messages: Vec<LintMessage>,
    pub suppressed: Vec<SuppressedMessage>,
}

/// Moves messages covered by a directive into `suppressed` and reports
/// directives that covered nothing at `report_unused` severity.
pub fn apply_directives(
    messages: Vec<LintMessage>,
    directives: &[Directive],
    report_unused: u8,
) -> DirectiveOutcome {
    let mut used: Vec<Vec<bool>> = directives
        .iter()
        .map(|d| vec![false; d.rule_ids.len().max(1)])
        .collect();
    let mut outcome = DirectiveOutcome::default();

    for message in messages {
        let mut covering = None;
        for (index, directive) in directives.iter().enumerate() {
            if let Some(slot) = directive.covers(&message) {
                used[index][slot] = true;
                covering.get_or_insert(index);
            }
        }
        match covering {
            Some(index) => outcome.suppressed.push(SuppressedMessage::new(
                message,
                SuppressionKind::Directive,
                directives[index].justification.clone().unwrap_or_default(),
            )),
            None => outcome.messages.push(message),
        }
    }

    if let Some(severity) = severity_from_level(report_unused) {
        for (directive, used) in directives.iter().zip(&used) {
            if directive.rule_ids.is_empty() {
                if !used[0] {
                    outcome.messages.push(unused_message(
                        directive,
                        severity,
                        "Unused eslint-disable directive (no problems were reported).".to_string(),
                    ));
                }
                continue;
            }
            for (rule_id, used) in directive.rule_ids.iter().zip(used) {
                if !used {
                    outcome.messages.push(unused_message(
                        directive,
                        severity,
                        format!(
                            "Unused eslint-disable directive (no problems were reported from '{rule_id}')."
                        ),
                    ));
                }
            }
        }
    }

    outcome
        .messages
        .sort_by_key(|message| (message.line, message.column));
    outcome
}

fn unused_message(directive: &Directive, severity: Severity, text: String) -> LintMessage {
    LintMessage::notice(severity, text).at(directive.line, directive.column)
}

/// Warnings for directives present while inline config is disabled by
/// the config file.
pub fn inline_config_warnings(directives: &[Directive]) -> Vec<LintMessage> {
    directives
        .iter()
        .map(|directive| {
            LintMessage::notice(
                Severity::Warning,
                format!(
                    "'{}' has no effect because you have 'noInlineConfig' setting in your config.",
                    directive.name
                ),
            )
            .at(directive.line, directive.column)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn directives(text: &str) -> Vec<Directive> {
        let source = SourceCode::parse(text).unwrap();
        let (directives, problems) = collect_directives(&source);
        assert!(problems.is_empty());
        directives
    }

    fn semi(line: u32) -> LintMessage {
        LintMessage::new("semi", Severity::Error, "Missing semicolon.", line, 10)
    }

    #[test]
    fn test_collect_disable_line() {
        let found = directives("a() // eslint-disable-line semi, no-var -- legacy code\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DirectiveKind::DisableLine);
        assert_eq!(found[0].rule_ids, vec!["semi", "no-var"]);
        assert_eq!(found[0].justification.as_deref(), Some("legacy code"));
        assert_eq!(found[0].target_line, 1);
    }

    #[test]
    fn test_collect_disable_next_line() {
        let found = directives("/* eslint-disable-next-line */\na()\n");
        assert_eq!(found[0].kind, DirectiveKind::DisableNextLine);
        assert!(found[0].rule_ids.is_empty());
        assert!(found[0].justification.is_none());
        assert_eq!(found[0].target_line, 2);
    }

    #[test]
    fn test_ignores_other_comments() {
        assert!(directives("// eslint-disable\n/* global a */\n// TODO\n").is_empty());
    }

    #[test]
    fn test_multiline_disable_line_is_a_problem() {
        let source = SourceCode::parse("a() /* eslint-disable-line\n semi */\n").unwrap();
        let (directives, problems) = collect_directives(&source);
        assert!(directives.is_empty());
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].severity, Severity::Error);
    }

    #[test]
    fn test_apply_suppresses_matching_rule() {
        let found = directives("a() // eslint-disable-line semi -- generated\nb()\n");
        let outcome = apply_directives(vec![semi(1), semi(2)], &found, 1);

        assert_eq!(outcome.messages, vec![semi(2)]);
        assert_eq!(outcome.suppressed.len(), 1);
        let record = &outcome.suppressed[0].suppressions[0];
        assert_eq!(record.kind, SuppressionKind::Directive);
        assert_eq!(record.justification, "generated");
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 1)]
    fn test_unused_directive_reporting(#[case] level: u8, #[case] expected: usize) {
        let found = directives("a() // eslint-disable-line no-var\n");
        let outcome = apply_directives(vec![semi(1)], &found, level);

        let unused: Vec<_> = outcome
            .messages
            .iter()
            .filter(|m| m.rule_id.is_none())
            .collect();
        assert_eq!(unused.len(), expected);
        if let Some(message) = unused.first() {
            assert_eq!(
                message.message,
                "Unused eslint-disable directive (no problems were reported from 'no-var')."
            );
            assert_eq!(message.severity.as_u8(), level);
        }
    }

    #[test]
    fn test_fatal_messages_are_not_suppressed() {
        let found = directives("// eslint-disable-next-line\n");
        let fatal = LintMessage::fatal("Parsing error: Unexpected token", 2, 1);
        let outcome = apply_directives(vec![fatal.clone()], &found, 0);
        assert_eq!(outcome.messages, vec![fatal]);
    }

    #[test]
    fn test_inline_config_warnings() {
        let found = directives("a() // eslint-disable-line\n");
        let warnings = inline_config_warnings(&found);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("noInlineConfig"));
    }
}
