//! `no-undef`: disallow references to undeclared variables.
//!
//! Scope-insensitive: a name declared anywhere in the file counts as
//! declared everywhere in it.

use std::collections::HashSet;

use lintpool_diagnostic::{RuleMeta, RuleType};

use super::{Enclosure, Report, Rule, RuleContext, RuleFailure, enclosures, starts_line};
use crate::config::GlobalAccess;
use crate::source::{CommentKind, SourceCode, TokenKind};

const BUILTIN_GLOBALS: &[&str] = &[
    "AggregateError", "Array", "ArrayBuffer", "Atomics", "BigInt", "BigInt64Array",
    "BigUint64Array", "Boolean", "DataView", "Date", "Error", "EvalError", "FinalizationRegistry",
    "Float32Array", "Float64Array", "Function", "Infinity", "Int16Array", "Int32Array",
    "Int8Array", "Intl", "JSON", "Map", "Math", "NaN", "Number", "Object", "Promise", "Proxy",
    "RangeError", "ReferenceError", "Reflect", "RegExp", "Set", "SharedArrayBuffer", "String",
    "Symbol", "SyntaxError", "TypeError", "URIError", "Uint16Array", "Uint32Array", "Uint8Array",
    "Uint8ClampedArray", "WeakMap", "WeakRef", "WeakSet", "arguments", "decodeURI",
    "decodeURIComponent", "encodeURI", "encodeURIComponent", "escape", "eval", "globalThis",
    "isFinite", "isNaN", "parseFloat", "parseInt", "undefined", "unescape",
];

/// Contextual words that are not references where they appear.
const CONTEXTUAL: &[&str] = &["as", "from", "of"];

const CLASS_MEMBER_PREFIXES: &[&str] = &["static", "get", "set", "async", "*", "#", "{", "}", ";"];

pub struct NoUndef;

impl Rule for NoUndef {
    fn meta(&self) -> RuleMeta {
        RuleMeta::new(
            RuleType::Problem,
            "Disallow the use of undeclared variables unless mentioned in `/*global */` comments",
        )
    }

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure> {
        let source = context.source;
        let check_typeof = context
            .object_option("typeof")
            .and_then(|value| value.as_bool())
            .unwrap_or(false);

        let mut declared: HashSet<&str> = BUILTIN_GLOBALS.iter().copied().collect();
        declared.extend(
            context
                .globals
                .iter()
                .filter(|(_, access)| **access != GlobalAccess::Off)
                .map(|(name, _)| name.as_str()),
        );
        declared.extend(comment_globals(source));
        declared.extend(declared_names(source));

        let enclosures = enclosures(source);
        let mut reports = Vec::new();
        for index in 0..source.tokens.len() {
            if source.tokens[index].kind != TokenKind::Identifier {
                continue;
            }
            let name = source.token_text(index);
            if declared.contains(name) || !is_reference(source, &enclosures, index) {
                continue;
            }
            if !check_typeof && index > 0 && source.is_keyword(index - 1, "typeof") {
                continue;
            }
            reports.push(
                Report::new(source.tokens[index].span, format!("'{name}' is not defined."))
                    .with_message_id("undef"),
            );
        }

        for report in reports {
            context.report(report);
        }
        Ok(())
    }
}

fn is_reference(source: &SourceCode, enclosures: &[Enclosure], index: usize) -> bool {
    let name = source.token_text(index);
    let previous = index.checked_sub(1).map(|i| source.token_text(i)).unwrap_or("");
    let next = source.token_text(index + 1);

    if matches!(previous, "." | "?." | "#") {
        return false;
    }
    // import and export specifiers
    if next == "as" || previous == "as" {
        return false;
    }
    if index > 0
        && (source.is_keyword(index - 1, "break") || source.is_keyword(index - 1, "continue"))
    {
        return false;
    }
    if CONTEXTUAL.contains(&name) && index > 0 {
        let before = source.tokens[index - 1];
        if before.kind == TokenKind::Identifier || matches!(previous, "}" | "]" | "*") {
            return false;
        }
    }

    match enclosures[index] {
        Enclosure::Object => {
            // keys and shorthand methods
            if next == ":" && matches!(previous, "{" | "," | "get" | "set" | "async" | "*") {
                return false;
            }
            if next == "(" && is_method_head(source, index + 1) {
                return false;
            }
        }
        Enclosure::Class => {
            if CLASS_MEMBER_PREFIXES.contains(&previous) || starts_line(source, index) {
                return false;
            }
        }
        Enclosure::TopLevel | Enclosure::Block => {
            // labels
            if next == ":" && (index == 0 || matches!(previous, ";" | "{" | "}")) {
                return false;
            }
        }
        Enclosure::Paren | Enclosure::Bracket => {}
    }
    true
}

/// True if the `(` at `open` is followed, after its `)`, by a `{`.
fn is_method_head(source: &SourceCode, open: usize) -> bool {
    source
        .matching_bracket(open)
        .is_some_and(|close| source.is_punct(close + 1, "{"))
}

/// Names from `/* global a, b:writable */` comments.
fn comment_globals(source: &SourceCode) -> Vec<&str> {
    let mut names = Vec::new();
    for comment in &source.comments {
        if comment.kind != CommentKind::Block {
            continue;
        }
        let body = source.slice(comment.value).trim_start();
        let list = body
            .strip_prefix("globals")
            .or_else(|| body.strip_prefix("global"))
            .filter(|rest| rest.starts_with(char::is_whitespace));
        let Some(list) = list else {
            continue;
        };
        for entry in list.split(',') {
            let name = entry.split(':').next().unwrap_or("").trim();
            if !name.is_empty() {
                names.push(name);
            }
        }
    }
    names
}

/// Every binding name declared anywhere in the file.
fn declared_names(source: &SourceCode) -> HashSet<&str> {
    let mut names = HashSet::new();
    let len = source.tokens.len();

    for index in 0..len {
        let token = source.tokens[index];
        let text = source.token_text(index);
        match (token.kind, text) {
            (TokenKind::Keyword, "var" | "let" | "const") => {
                collect_declarators(source, index + 1, &mut names);
            }
            (TokenKind::Keyword, "function") => {
                let mut next = index + 1;
                if source.is_punct(next, "*") {
                    next += 1;
                }
                if source.tokens.get(next).is_some_and(|t| t.kind == TokenKind::Identifier) {
                    names.insert(source.token_text(next));
                    next += 1;
                }
                if source.is_punct(next, "(") {
                    collect_params(source, next, &mut names);
                }
            }
            (TokenKind::Keyword, "class") => {
                if source.tokens.get(index + 1).is_some_and(|t| t.kind == TokenKind::Identifier) {
                    names.insert(source.token_text(index + 1));
                }
            }
            (TokenKind::Keyword, "catch") => {
                if source.is_punct(index + 1, "(") {
                    collect_params(source, index + 1, &mut names);
                }
            }
            (TokenKind::Keyword, "import") => collect_imports(source, index + 1, &mut names),
            (TokenKind::Punctuator, "=>") if index > 0 => {
                let previous = index - 1;
                if source.tokens[previous].kind == TokenKind::Identifier {
                    names.insert(source.token_text(previous));
                } else if let Some(open) = source.opening_bracket(previous) {
                    collect_params(source, open, &mut names);
                }
            }
            (TokenKind::Punctuator, "(") => {
                // method and function parameter lists: `name(a, b) {`
                let control = index > 0
                    && ["if", "for", "while", "switch", "with", "catch"]
                        .iter()
                        .any(|k| source.is_keyword(index - 1, k));
                if !control && is_method_head(source, index) {
                    collect_params(source, index, &mut names);
                }
            }
            _ => {}
        }
    }

    names
}

fn collect_params<'a>(source: &'a SourceCode, open: usize, names: &mut HashSet<&'a str>) {
    if let Some(close) = source.matching_bracket(open) {
        collect_pattern(source, open + 1, close, names);
    }
}

/// Collects binding names in the pattern tokens `[start, end)`.
fn collect_pattern<'a>(
    source: &'a SourceCode,
    start: usize,
    end: usize,
    names: &mut HashSet<&'a str>,
) {
    let mut depth = 0usize;
    let mut default_depth: Option<usize> = None;

    for index in start..end {
        let text = source.token_text(index);
        match text {
            "(" | "[" | "{" => {
                depth += 1;
                continue;
            }
            ")" | "]" | "}" => {
                depth = depth.saturating_sub(1);
                if default_depth.is_some_and(|d| depth < d) {
                    default_depth = None;
                }
                continue;
            }
            "," => {
                if default_depth.is_some_and(|d| depth <= d) {
                    default_depth = None;
                }
                continue;
            }
            "=" => {
                if default_depth.is_none() {
                    default_depth = Some(depth);
                }
                continue;
            }
            _ => {}
        }
        if default_depth.is_some() || source.tokens[index].kind != TokenKind::Identifier {
            continue;
        }
        if source.is_punct(index + 1, ":") {
            continue;
        }
        names.insert(text);
    }
}

fn collect_declarators<'a>(source: &'a SourceCode, start: usize, names: &mut HashSet<&'a str>) {
    let len = source.tokens.len();
    let mut index = start;

    while index < len {
        // binding
        let text = source.token_text(index);
        if text == "{" || text == "[" {
            let Some(close) = source.matching_bracket(index) else {
                return;
            };
            collect_pattern(source, index + 1, close, names);
            index = close + 1;
        } else if source.tokens[index].kind == TokenKind::Identifier {
            names.insert(text);
            index += 1;
        } else {
            return;
        }

        // initializer
        let mut depth = 0usize;
        loop {
            if index >= len {
                return;
            }
            let text = source.token_text(index);
            match text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                ";" if depth == 0 => return,
                "," if depth == 0 => {
                    index += 1;
                    break;
                }
                _ if depth == 0
                    && (source.is_keyword(index, "in") || text == "of") =>
                {
                    return;
                }
                _ => {}
            }
            index += 1;
        }
    }
}

fn collect_imports<'a>(source: &'a SourceCode, start: usize, names: &mut HashSet<&'a str>) {
    for index in start..source.tokens.len() {
        let token = source.tokens[index];
        let text = source.token_text(index);
        if token.kind == TokenKind::String || text == ";" {
            return;
        }
        if token.kind != TokenKind::Identifier || text == "as" {
            continue;
        }
        if text == "from" && !source.is_punct(index + 1, ",") {
            return;
        }
        if source.token_text(index + 1) == "as" {
            continue;
        }
        names.insert(text);
    }
}
