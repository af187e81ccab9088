//! `no-var`: require `let` or `const` instead of `var`.

use std::collections::HashMap;

use lintpool_diagnostic::{Fix, FixableKind, RuleMeta, RuleType};

use super::{Report, Rule, RuleContext, RuleFailure};
use crate::source::TokenKind;

pub struct NoVar;

impl Rule for NoVar {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new(RuleType::Suggestion, "Require `let` or `const` instead of `var`")
            .fixable(FixableKind::Code)
    }

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let source = context.source;

        // Redeclared names cannot be switched to `let` safely.
        let mut declarations: HashMap<&str, usize> = HashMap::new();
        for index in 0..source.tokens.len() {
            if source.is_keyword(index, "var")
                && source
                    .tokens
                    .get(index + 1)
                    .is_some_and(|t| t.kind == TokenKind::Identifier)
            {
                *declarations.entry(source.token_text(index + 1)).or_default() += 1;
            }
        }

        let mut reports = Vec::new();
        for index in 0..source.tokens.len() {
            if !source.is_keyword(index, "var") {
                continue;
            }
            let span = source.tokens[index].span;
            let mut report = Report::new(span, "Unexpected var, use let or const instead.")
                .with_message_id("unexpectedVar");
            let name = source.token_text(index + 1);
            let redeclared = declarations.get(name).is_some_and(|count| *count > 1);
            if !redeclared {
                report = report.with_fix(Fix::new(span, "let"));
            }
            reports.push(report);
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

    #[test]
    fn test_reports_and_fixes_var() {
        let text = "var x = 1;\nfor (var i = 0; i < 3; i++) {}\n";
        let reports = run(&NoVar, text, &[]);
        assert_eq!(reports.len(), 2);
        assert_eq!(
            apply(text, &reports),
            "let x = 1;\nfor (let i = 0; i < 3; i++) {}\n"
        );
    }

    #[test]
    fn test_redeclaration_is_not_fixed() {
        let reports = run(&NoVar, "var a = 1;\nvar a = 2;\nvar b = 3;\n", &[]);
        assert_eq!(reports.len(), 3);
        assert!(reports[0].fix.is_none());
        assert!(reports[1].fix.is_none());
        assert!(reports[2].fix.is_some());
    }

    #[test]
    fn test_let_and_const_are_fine() {
        assert!(run(&NoVar, "let a = 1; const b = 'var';", &[]).is_empty());
    }
}
