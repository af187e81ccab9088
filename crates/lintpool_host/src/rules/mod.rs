//! Rule framework and the built-in rules.

mod eqeqeq;
mod no_console;
mod no_debugger;
mod no_extra_semi;
mod no_trailing_spaces;
mod no_undef;
mod no_var;
mod semi;

use std::collections::BTreeMap;
use std::sync::Arc;

use lintpool_diagnostic::{Fix, RuleMeta, Span};
use serde_json::Value;

use crate::config::GlobalAccess;
use crate::source::{SourceCode, TokenKind};

pub use eqeqeq::Eqeqeq;
pub use no_console::NoConsole;
pub use no_debugger::NoDebugger;
pub use no_extra_semi::NoExtraSemi;
pub use no_trailing_spaces::NoTrailingSpaces;
pub use no_undef::NoUndef;
pub use no_var::NoVar;
pub use semi::Semi;

/// A failure raised by a rule while checking a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure(pub String);

impl std::fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleFailure {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for RuleFailure {
    fn from(message: String) -> Self {
        Self(message)
    }
}

/// A problem found by a rule, before severity and position are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub span: Span,
    pub message: String,
    pub message_id: Option<String>,
    pub fix: Option<Fix>,
}

impl Report {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            message_id: None,
            fix: None,
        }
    }

    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }
}

/// What a rule sees while checking one file.
pub struct RuleContext<'a> {
    pub source: &'a SourceCode,
    /// Options following the severity in the rule's configuration.
    pub options: &'a [Value],
    /// Globals declared by configuration and `--global`.
    pub globals: &'a BTreeMap<String, GlobalAccess>,
    reports: Vec<Report>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        source: &'a SourceCode,
        options: &'a [Value],
        globals: &'a BTreeMap<String, GlobalAccess>,
    ) -> Self {
        Self {
            source,
            options,
            globals,
            reports: Vec::new(),
        }
    }

    pub fn report(&mut self, report: Report) {
        self.reports.push(report);
    }

    /// The first option, if it is a string.
    pub fn string_option(&self, index: usize) -> Option<&str> {
        self.options.get(index).and_then(Value::as_str)
    }

    /// A key of the first object option.
    pub fn object_option(&self, key: &str) -> Option<&Value> {
        self.options
            .iter()
            .find_map(|value| value.as_object())
            .and_then(|object| object.get(key))
    }

    pub fn into_reports(self) -> Vec<Report> {
        self.reports
    }
}

/// A lint rule.
pub trait Rule: Send + Sync {
    fn meta(&self) -> RuleMeta;

    fn check(&self, context: &mut RuleContext<'_>) -> Result<(), RuleFailure>;
}

/// Rules addressable by id.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<String, Arc<dyn Rule>>,
}

impl RuleRegistry {
    /// Creates a registry holding the built-in rules.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.register("eqeqeq", Eqeqeq);
        registry.register("no-console", NoConsole);
        registry.register("no-debugger", NoDebugger);
        registry.register("no-extra-semi", NoExtraSemi);
        registry.register("no-trailing-spaces", NoTrailingSpaces);
        registry.register("no-undef", NoUndef);
        registry.register("no-var", NoVar);
        registry.register("semi", Semi);
        registry
    }

    pub fn register(&mut self, id: impl Into<String>, rule: impl Rule + 'static) {
        self.rules.insert(id.into(), Arc::new(rule));
    }

    pub fn register_shared(&mut self, id: impl Into<String>, rule: Arc<dyn Rule>) {
        self.rules.insert(id.into(), rule);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rules.keys()).finish()
    }
}

/// The bracket a token sits directly inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Enclosure {
    TopLevel,
    Block,
    Class,
    Object,
    Paren,
    Bracket,
}

impl Enclosure {
    /// True where statements appear.
    pub(crate) fn is_statement_list(self) -> bool {
        matches!(self, Enclosure::TopLevel | Enclosure::Block)
    }
}

/// Computes, for every token, the bracket it sits directly inside. Opening
/// and closing brackets belong to the outer context.
pub(crate) fn enclosures(source: &SourceCode) -> Vec<Enclosure> {
    let mut stack: Vec<Enclosure> = Vec::new();
    let mut result = Vec::with_capacity(source.tokens.len());

    for (index, token) in source.tokens.iter().enumerate() {
        let current = stack.last().copied().unwrap_or(Enclosure::TopLevel);
        if token.kind != TokenKind::Punctuator {
            result.push(current);
            continue;
        }
        match source.token_text(index) {
            "(" => {
                result.push(current);
                stack.push(Enclosure::Paren);
            }
            "[" => {
                result.push(current);
                stack.push(Enclosure::Bracket);
            }
            "{" => {
                result.push(current);
                stack.push(classify_brace(source, index, current));
            }
            ")" | "]" | "}" => {
                stack.pop();
                result.push(stack.last().copied().unwrap_or(Enclosure::TopLevel));
            }
            _ => result.push(current),
        }
    }

    result
}

fn classify_brace(source: &SourceCode, open: usize, outer: Enclosure) -> Enclosure {
    if open == 0 {
        return Enclosure::Block;
    }
    let previous = open - 1;
    let text = source.token_text(previous);
    let kind = source.tokens[previous].kind;

    if is_class_head(source, open) {
        return Enclosure::Class;
    }

    match kind {
        TokenKind::Punctuator => match text {
            ")" | "=>" | ";" | "{" | "}" => Enclosure::Block,
            ":" if outer.is_statement_list() => Enclosure::Block,
            _ => Enclosure::Object,
        },
        TokenKind::Keyword => match text {
            "else" | "do" | "try" | "finally" => Enclosure::Block,
            _ => Enclosure::Object,
        },
        TokenKind::Identifier => Enclosure::Block,
        _ => Enclosure::Object,
    }
}

/// True if the brace at `open` starts a class body.
fn is_class_head(source: &SourceCode, open: usize) -> bool {
    let mut index = open;
    let mut steps = 0;
    while index > 0 && steps < 8 {
        index -= 1;
        steps += 1;
        if source.is_keyword(index, "class") {
            return true;
        }
        let text = source.token_text(index);
        let allowed = source.tokens[index].kind == TokenKind::Identifier
            || source.is_keyword(index, "extends")
            || text == ".";
        if !allowed {
            return false;
        }
    }
    false
}

/// True if `token` at `index` is the first token on its line.
pub(crate) fn starts_line(source: &SourceCode, index: usize) -> bool {
    index == 0 || source.tokens[index - 1].end_line < source.tokens[index].line
}
