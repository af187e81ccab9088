//! `no-console`: disallow calls to `console` methods.

use lintpool_diagnostic::{RuleMeta, RuleType, Span};

use super::{Report, Rule, RuleContext, RuleFailure};
use crate::source::TokenKind;

pub struct NoConsole;

impl Rule for NoConsole {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new(RuleType::Suggestion, "Disallow the use of `console`")
    }

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let allowed: Vec<String> = context
            .object_option("allow")
            .and_then(|value| value.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let source = context.source;
        let mut reports = Vec::new();
        for index in 0..source.tokens.len() {
            let token = source.tokens[index];
            if token.kind != TokenKind::Identifier || source.token_text(index) != "console" {
                continue;
            }
            if index > 0 && (source.is_punct(index - 1, ".") || source.is_punct(index - 1, "?.")) {
                continue;
            }
            if !source.is_punct(index + 1, ".") {
                continue;
            }
            let method = source.token_text(index + 2);
            if allowed.iter().any(|name| name == method) {
                continue;
            }
            let end = source
                .tokens
                .get(index + 2)
                .map(|t| t.span.end)
                .unwrap_or(token.span.end);
            reports.push(
                Report::new(Span::new(token.span.start, end), "Unexpected console statement.")
                    .with_message_id("unexpected"),
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
    use crate::rules::test_support::run;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_reports_console_calls() {
        let reports = run(&NoConsole, "console.log(1);\nconsole.error(2);\n", &[]);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].span, Span::new(0, 11));
    }

    #[test]
    fn test_allow_option() {
        let options = [json!({ "allow": ["error", "warn"] })];
        let reports = run(&NoConsole, "console.log(1);\nconsole.error(2);\n", &options);
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_member_named_console_is_ignored() {
        assert!(run(&NoConsole, "window.console.log(1); const console = 1;", &[]).is_empty());
    }
}
