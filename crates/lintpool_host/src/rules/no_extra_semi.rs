//! `no-extra-semi`: disallow unnecessary semicolons.

use lintpool_diagnostic::{Fix, FixableKind, RuleMeta, RuleType};

use super::{Enclosure, Report, Rule, RuleContext, RuleFailure, enclosures};
use crate::source::{SourceCode, TokenKind};

const BLOCK_STATEMENT_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "with"];

pub struct NoExtraSemi;

impl Rule for NoExtraSemi {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new(RuleType::Suggestion, "Disallow unnecessary semicolons")
            .fixable(FixableKind::Code)
            .deprecated(["@stylistic/no-extra-semi"])
    }

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let source = context.source;
        let enclosures = enclosures(source);
        let mut reports = Vec::new();

        for index in 0..source.tokens.len() {
            if !source.is_punct(index, ";") {
                continue;
            }
            let enclosure = enclosures[index];
            if !enclosure.is_statement_list() && enclosure != Enclosure::Class {
                continue;
            }
            let extra = if index == 0 {
                true
            } else if enclosure == Enclosure::Class {
                matches!(source.token_text(index - 1), ";" | "{" | "}")
            } else {
                match source.token_text(index - 1) {
                    ";" | "{" => true,
                    "}" => closes_statement_block(source, index - 1),
                    _ => false,
                }
            };
            if extra {
                let span = source.tokens[index].span;
                reports.push(
                    Report::new(span, "Unnecessary semicolon.")
                        .with_message_id("unexpected")
                        .with_fix(Fix::delete(span)),
                );
            }
        }

        for report in reports {
            context.report(report);
        }
        Ok(())
    }
}

/// True if the `}` at `close` ends a statement that needs no semicolon:
/// a block, a control statement body, or a function or class declaration.
fn closes_statement_block(source: &SourceCode, close: usize) -> bool {
    let Some(open) = source.opening_bracket(close) else {
        return false;
    };
    if open == 0 {
        return true;
    }
    let before = open - 1;
    let before_text = source.token_text(before);
    if matches!(before_text, ";" | "{" | "}") {
        return true;
    }
    if ["else", "try", "finally", "do"]
        .iter()
        .any(|k| source.is_keyword(before, k))
    {
        return true;
    }
    if before_text == ")" {
        let Some(paren) = source.opening_bracket(before) else {
            return false;
        };
        if paren == 0 {
            return false;
        }
        let head = paren - 1;
        if BLOCK_STATEMENT_KEYWORDS.iter().any(|k| source.is_keyword(head, k)) {
            return true;
        }
        let function = if source.tokens[head].kind == TokenKind::Identifier && head > 0 {
            head - 1
        } else {
            head
        };
        return source.is_keyword(function, "function") && starts_statement(source, function);
    }
    // class declaration bodies
    (0..open)
        .rev()
        .take(6)
        .find(|&i| source.is_keyword(i, "class"))
        .is_some_and(|class| starts_statement(source, class))
}

fn starts_statement(source: &SourceCode, index: usize) -> bool {
    index == 0 || matches!(source.token_text(index - 1), ";" | "{" | "}")
        || source.is_keyword(index - 1, "export")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply, run};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("var x = 5;;", 1)]
    #[case("function foo() {\n  // code\n};", 1)]
    #[case("if (a) {};", 1)]
    #[case("class C {\n  m() {};\n}", 1)]
    #[case("var f = function() {};", 0)]
    #[case("const o = {};", 0)]
    #[case("for (;;);", 0)]
    #[case("a();\nb();", 0)]
    fn test_no_extra_semi(#[case] text: &str, #[case] expected: usize) {
        assert_eq!(run(&NoExtraSemi, text, &[]).len(), expected, "{text}");
    }

    #[test]
    fn test_fix_removes_semicolon() {
        let text = "var x = 5;;";
        let reports = run(&NoExtraSemi, text, &[]);
        assert_eq!(apply(text, &reports), "var x = 5;");
        assert_eq!(reports[0].message, "Unnecessary semicolon.");
    }

    #[test]
    fn test_meta_is_deprecated() {
        let meta = NoExtraSemi.meta();
        assert!(meta.deprecated);
        assert_eq!(meta.replaced_by, vec!["@stylistic/no-extra-semi".to_string()]);
    }
}
