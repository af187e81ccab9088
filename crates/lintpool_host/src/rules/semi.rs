//! `semi`: require or disallow semicolons at the end of statements.

use lintpool_diagnostic::{Fix, FixableKind, RuleMeta, RuleType, Span};

use super::{Enclosure, Report, Rule, RuleContext, RuleFailure, enclosures};
use crate::source::{SourceCode, TokenKind};

/// Punctuators that continue an expression when they start the next line.
const CONTINUATIONS: &[&str] = &[
    ".", "?.", ",", ")", "]", "=>", "?", ":", "=", "+", "-", "*", "/", "%", "**", "==", "===",
    "!=", "!==", "<", ">", "<=", ">=", "&&", "||", "??", "&", "|", "^", "<<", ">>", ">>>", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "**=", "<<=", ">>=", ">>>=", "&&=", "||=", "??=",
    "(", "[", ";",
];

/// Tokens that make a missing semicolon before them hazardous.
const ASI_HAZARDS: &[&str] = &["[", "(", "+", "-", "/", "`"];

const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "with", "switch", "catch"];

pub struct Semi;

impl Rule for Semi {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new(RuleType::Layout, "Require or disallow semicolons instead of ASI")
            .fixable(FixableKind::Code)
    }

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let mode = context.string_option(0).unwrap_or("always");
        match mode {
            "always" => check_always(context),
            "never" => check_never(context),
            other => Err(RuleFailure(format!(
                "Value \"{other}\" should be equal to one of the allowed values: always, never"
            ))),
        }
    }
}

fn check_always(context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
    let source = context.source;
    let enclosures = enclosures(source);
    let mut reports = Vec::new();

    for index in 0..source.tokens.len() {
        if !enclosures[index].is_statement_list() && enclosures[index] != Enclosure::Class {
            continue;
        }
        if !can_end_statement(source, index) {
            continue;
        }

        let token = source.tokens[index];
        let ends = match source.tokens.get(index + 1) {
            None => true,
            Some(next) => {
                let next_text = source.token_text(index + 1);
                if next_text == ";" {
                    false
                } else if next_text == "}" {
                    true
                } else if next.line > token.end_line {
                    !is_continuation(source, index + 1)
                } else {
                    false
                }
            }
        };

        if ends {
            reports.push(
                Report::new(Span::empty(token.span.end), "Missing semicolon.")
                    .with_message_id("missingSemi")
                    .with_fix(Fix::insert(token.span.end, ";")),
            );
        }
    }

    for report in reports {
        context.report(report);
    }
    Ok(())
}

fn check_never(context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
    let source = context.source;
    let enclosures = enclosures(source);
    let mut reports = Vec::new();

    for index in 0..source.tokens.len() {
        if !source.is_punct(index, ";") || !enclosures[index].is_statement_list() {
            continue;
        }
        let token = source.tokens[index];
        let removable = match source.tokens.get(index + 1) {
            None => true,
            Some(next) => {
                let next_text = source.token_text(index + 1);
                if next_text == "}" {
                    true
                } else if next.line > token.end_line {
                    let hazard = ASI_HAZARDS.iter().any(|h| next_text.starts_with(h))
                        || matches!(next_text, "++" | "--");
                    !hazard
                } else {
                    false
                }
            }
        };
        if removable && index > 0 && can_end_statement(source, index - 1) {
            reports.push(
                Report::new(token.span, "Extra semicolon.")
                    .with_message_id("extraSemi")
                    .with_fix(Fix::delete(token.span)),
            );
        }
    }

    for report in reports {
        context.report(report);
    }
    Ok(())
}

fn can_end_statement(source: &SourceCode, index: usize) -> bool {
    let token = source.tokens[index];
    let text = source.token_text(index);
    match token.kind {
        TokenKind::Identifier
        | TokenKind::Number
        | TokenKind::String
        | TokenKind::Template
        | TokenKind::RegExp => true,
        TokenKind::Keyword => matches!(
            text,
            "this"
                | "null"
                | "true"
                | "false"
                | "super"
                | "break"
                | "continue"
                | "return"
                | "debugger"
        ),
        TokenKind::Punctuator => match text {
            ")" => !closes_control_head(source, index),
            "]" | "++" | "--" => true,
            _ => false,
        },
    }
}

/// True if the `)` at `close` ends the head of a control statement or of a
/// function declaration.
fn closes_control_head(source: &SourceCode, close: usize) -> bool {
    let Some(open) = source.opening_bracket(close) else {
        return false;
    };
    if open == 0 {
        return false;
    }
    let before = open - 1;
    if CONTROL_KEYWORDS.iter().any(|k| source.is_keyword(before, k)) {
        return true;
    }
    source.is_keyword(before, "function")
        || (source.tokens[before].kind == TokenKind::Identifier
            && before > 0
            && source.is_keyword(before - 1, "function"))
}

fn is_continuation(source: &SourceCode, index: usize) -> bool {
    let token = source.tokens[index];
    let text = source.token_text(index);
    match token.kind {
        TokenKind::Punctuator => CONTINUATIONS.contains(&text),
        TokenKind::Template => true,
        TokenKind::Keyword => matches!(text, "in" | "instanceof"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{apply, run};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_missing_semicolon_at_end_of_file() {
        let reports = run(&Semi, "var x = 1", &[]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].span, Span::empty(9));
        assert_eq!(reports[0].message, "Missing semicolon.");
        assert_eq!(apply("var x = 1", &reports), "var x = 1;");
    }

    #[rstest]
    #[case("var x = 1;", 0)]
    #[case("var x = 1\nvar y = 2\n", 2)]
    #[case("foo()\n.bar()\n", 1)]
    #[case("if (a) {\n  b()\n}\n", 1)]
    #[case("if (a)\n  b();\n", 0)]
    #[case("function f(a)\n{\n  return a;\n}\n", 0)]
    #[case("const o = {\n  a: 1,\n  b: 2\n};\n", 0)]
    #[case("for (let i = 0; i < n; i++) {}\n", 0)]
    #[case("const s = `a\nb`\n", 1)]
    #[case("x = a\n  + b;\n", 0)]
    #[case("function f() { return }\n", 1)]
    #[case("class A {\n  x = 1\n  m() {}\n}\n", 1)]
    fn test_always(#[case] text: &str, #[case] expected: usize) {
        assert_eq!(run(&Semi, text, &[]).len(), expected, "{text}");
    }

    #[test]
    fn test_fix_inserts_after_last_token() {
        let text = "let a = f(1)\nlet b = [2]\n";
        let reports = run(&Semi, text, &[json!("always")]);
        assert_eq!(apply(text, &reports), "let a = f(1);\nlet b = [2];\n");
    }

    #[rstest]
    #[case("var x = 1;\n", 1)]
    #[case("var x = 1\n", 0)]
    #[case("a();\n[1, 2].forEach(f)\n", 0)]
    #[case("for (;;) {}\n", 0)]
    #[case("a(); b();\n", 1)]
    fn test_never(#[case] text: &str, #[case] expected: usize) {
        assert_eq!(run(&Semi, text, &[json!("never")]).len(), expected, "{text}");
    }

    #[test]
    fn test_never_fix_removes_semicolon() {
        let text = "var x = 1;\nfoo();\n";
        let reports = run(&Semi, text, &[json!("never")]);
        assert_eq!(apply(text, &reports), "var x = 1\nfoo()\n");
        assert_eq!(reports[0].message, "Extra semicolon.");
    }

    #[test]
    fn test_invalid_option_fails() {
        let source = SourceCode::parse("a").unwrap();
        let globals = Default::default();
        let options = [json!("sometimes")];
        let mut context = RuleContext::new(&source, &options, &globals);
        assert!(Semi.check(&mut context).is_err());
    }
}
