//! `eqeqeq`: require `===` and `!==`.

use lintpool_diagnostic::{Fix, FixableKind, RuleMeta, RuleType};

use super::{Report, Rule, RuleContext, RuleFailure};
use crate::source::{SourceCode, TokenKind};

pub struct Eqeqeq;

impl Rule for Eqeqeq {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new(RuleType::Suggestion, "Require the use of `===` and `!==`")
            .fixable(FixableKind::Code)
    }

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let mode = context.string_option(0).unwrap_or("always");
        if mode != "always" && mode != "smart" {
            return Err(RuleFailure(format!(
                "Value \"{mode}\" should be equal to one of the allowed values: always, smart"
            )));
        }
        let ignore_null = context
            .object_option("null")
            .and_then(|value| value.as_str())
            == Some("ignore");

        let source = context.source;
        let mut reports = Vec::new();
        for index in 0..source.tokens.len() {
            let operator = source.token_text(index);
            if source.tokens[index].kind != TokenKind::Punctuator
                || !matches!(operator, "==" | "!=")
            {
                continue;
            }
            let null_compare = source.is_keyword(index + 1, "null")
                || (index > 0 && source.is_keyword(index - 1, "null"));
            if null_compare && (mode == "smart" || ignore_null) {
                continue;
            }
            let safe = is_typeof_comparison(source, index) || same_literal_kinds(source, index);
            if mode == "smart" && safe {
                continue;
            }

            let expected = format!("{operator}=");
            let span = source.tokens[index].span;
            let mut report = Report::new(
                span,
                format!("Expected '{expected}' and instead saw '{operator}'."),
            )
            .with_message_id("unexpected");
            if safe {
                report = report.with_fix(Fix::new(span, expected));
            }
            reports.push(report);
        }

        for report in reports {
            context.report(report);
        }
        Ok(())
    }
}

fn is_typeof_comparison(source: &SourceCode, operator: usize) -> bool {
    (operator >= 2 && source.is_keyword(operator - 2, "typeof"))
        || source.is_keyword(operator + 1, "typeof")
}

fn same_literal_kinds(source: &SourceCode, operator: usize) -> bool {
    if operator == 0 {
        return false;
    }
    let (Some(left), Some(right)) = (
        source.tokens.get(operator - 1),
        source.tokens.get(operator + 1),
    ) else {
        return false;
    };
    left.kind == right.kind && matches!(left.kind, TokenKind::String | TokenKind::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply, run};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_reports_loose_equality() {
        let reports = run(&Eqeqeq, "if (a == b || c != d) {}", &[]);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].message, "Expected '===' and instead saw '=='.");
        assert_eq!(reports[1].message, "Expected '!==' and instead saw '!='.");
        assert!(reports[0].fix.is_none());
    }

    #[test]
    fn test_typeof_comparison_is_fixed() {
        let text = "if (typeof a == 'string') {}";
        let reports = run(&Eqeqeq, text, &[]);
        assert_eq!(apply(text, &reports), "if (typeof a === 'string') {}");
    }

    #[rstest]
    #[case("a == null", 0)]
    #[case("typeof a == 'x'", 0)]
    #[case("1 == 2", 0)]
    #[case("a == b", 1)]
    fn test_smart(#[case] text: &str, #[case] expected: usize) {
        assert_eq!(run(&Eqeqeq, text, &[json!("smart")]).len(), expected);
    }

    #[test]
    fn test_null_ignore() {
        let options = [json!("always"), json!({ "null": "ignore" })];
        assert!(run(&Eqeqeq, "a != null", &options).is_empty());
        assert_eq!(run(&Eqeqeq, "a != null", &[]).len(), 1);
    }

    #[test]
    fn test_strict_equality_is_fine() {
        assert!(run(&Eqeqeq, "a === b; c !== d; e = f", &[]).is_empty());
    }
}
