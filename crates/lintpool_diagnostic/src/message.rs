//! Lint message types.

use serde::{Deserialize, Serialize};

use crate::Span;

/// Severity of a reported message.
///
/// Serialized as the integers `1` (warning) and `2` (error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Severity {
    /// Reported, but does not fail the run.
    Warning,
    /// Fails the run unless suppressed.
    Error,
}

impl Severity {
    /// Numeric form used on the wire and in config files.
    pub const fn as_u8(self) -> u8 {
        match self {
            Severity::Warning => 1,
            Severity::Error => 2,
        }
    }

    /// Returns true for [`Severity::Error`].
    pub const fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.as_u8()
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            1 => Ok(Severity::Warning),
            2 => Ok(Severity::Error),
            other => Err(format!("invalid message severity {other}, expected 1 or 2")),
        }
    }
}

/// A text replacement attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub struct Fix {
    /// The byte range to replace.
    pub range: Span,
    /// The replacement text.
    pub text: String,
}

impl Fix {
    /// Creates a new fix.
    pub fn new(range: Span, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    /// Creates a fix that inserts text at a position.
    pub fn insert(offset: u32, text: impl Into<String>) -> Self {
        Self::new(Span::empty(offset), text)
    }

    /// Creates a fix that deletes a span.
    pub fn delete(range: Span) -> Self {
        Self::new(range, "")
    }
}

/// A single problem reported for a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[serde(rename_all = "camelCase")]
pub struct LintMessage {
    /// Reporting rule. `None` for parse errors and ignore notices.
    pub rule_id: Option<String>,

    pub severity: Severity,

    pub message: String,

    /// 1-based line.
    pub line: u32,

    /// 1-based column.
    pub column: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,

    /// Set for unrecoverable parse errors.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fatal: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl LintMessage {
    /// Creates a message reported by `rule_id` at the given position.
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            rule_id: Some(rule_id.into()),
            severity,
            message: message.into(),
            line,
            column,
            end_line: None,
            end_column: None,
            fatal: false,
            message_id: None,
            node_type: None,
            fix: None,
        }
    }

    /// Creates a fatal parse-error message.
    pub fn fatal(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            rule_id: None,
            severity: Severity::Error,
            message: message.into(),
            line,
            column,
            end_line: None,
            end_column: None,
            fatal: true,
            message_id: None,
            node_type: None,
            fix: None,
        }
    }

    /// Creates a message that is not tied to a rule or a source position,
    /// such as an ignored-file notice. Line and column are `0`.
    pub fn notice(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: None,
            severity,
            message: message.into(),
            line: 0,
            column: 0,
            end_line: None,
            end_column: None,
            fatal: false,
            message_id: None,
            node_type: None,
            fix: None,
        }
    }

    /// Moves the message to a source position.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Sets the end position.
    pub fn with_end(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }

    /// Sets an auto-fix.
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Sets the message id.
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Sets the node type.
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// True when the message counts as an error.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }

    /// True when the message is an error that a suppression may cover:
    /// error severity, a rule id, and not a parse failure.
    pub fn is_suppressible(&self) -> bool {
        self.is_error() && !self.fatal && self.rule_id.is_some()
    }
}

/// Where a suppression came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionKind {
    /// An inline `eslint-disable-*` comment.
    Directive,
    /// The suppressions database.
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub struct SuppressionRecord {
    pub kind: SuppressionKind,
    #[serde(default)]
    pub justification: String,
}

/// A message that was reported but suppressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "rkyv",
    derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)
)]
pub struct SuppressedMessage {
    #[serde(flatten)]
    pub message: LintMessage,
    pub suppressions: Vec<SuppressionRecord>,
}

impl SuppressedMessage {
    /// Wraps `message` with a single suppression of the given kind.
    pub fn new(
        message: LintMessage,
        kind: SuppressionKind,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            message,
            suppressions: vec![SuppressionRecord {
                kind,
                justification: justification.into(),
            }],
        }
    }

    /// Wraps `message` as suppressed by the suppressions database.
    pub fn from_file(message: LintMessage) -> Self {
        Self::new(message, SuppressionKind::File, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_severity_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Severity::Error).unwrap(), "2");
    }

    #[test]
    fn test_severity_rejects_zero() {
        let parsed: Result<Severity, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_message_camel_case_keys() {
        let message = LintMessage::new("semi", Severity::Error, "Missing semicolon.", 1, 10)
            .with_end(1, 11)
            .with_message_id("missingSemi");
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["ruleId"], "semi");
        assert_eq!(json["severity"], 2);
        assert_eq!(json["endLine"], 1);
        assert_eq!(json["messageId"], "missingSemi");
        assert!(json.get("fatal").is_none());
        assert!(json.get("fix").is_none());
    }

    #[test]
    fn test_fatal_message() {
        let message = LintMessage::fatal("Parsing error: Unterminated string", 3, 7);
        assert!(message.fatal);
        assert!(message.rule_id.is_none());
        assert_eq!(message.severity, Severity::Error);
        assert!(!message.is_suppressible());

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["ruleId"], serde_json::Value::Null);
        assert_eq!(json["fatal"], true);
    }

    #[test]
    fn test_warning_is_not_suppressible() {
        let message =
            LintMessage::new("no-console", Severity::Warning, "Unexpected console.", 1, 1);
        assert!(!message.is_suppressible());
    }

    #[test]
    fn test_suppressed_message_flattens() {
        let message = LintMessage::new("semi", Severity::Error, "Missing semicolon.", 1, 10);
        let suppressed = SuppressedMessage::from_file(message);
        let json = serde_json::to_value(&suppressed).unwrap();

        assert_eq!(json["ruleId"], "semi");
        assert_eq!(json["suppressions"][0]["kind"], "file");
        assert_eq!(json["suppressions"][0]["justification"], "");
    }

    #[test]
    fn test_message_roundtrip_with_fix() {
        let message = LintMessage::new("semi", Severity::Error, "Missing semicolon.", 1, 10)
            .with_fix(Fix::insert(9, ";"));
        let json = serde_json::to_string(&message).unwrap();
        let back: LintMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }
}
