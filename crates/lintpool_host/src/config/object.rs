//! Config objects as written in `lintpool.config.json`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::HostError;
use crate::helpers::normalize_severity;

/// One element of a config file's top-level array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Glob patterns of files this object applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    /// Glob patterns excluded from this object, or ignored globally when
    /// this is the only key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignores: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_options: Option<LanguageOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linter_options: Option<LinterOptions>,

    /// Plugin short names whose rules may be configured.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<String>,

    /// Directory patterns are relative to. Defaults to the config array's
    /// base path.
    #[serde(skip)]
    pub base_path: Option<PathBuf>,
}

impl ConfigObject {
    /// True for an object that only lists `ignores`, which then apply to
    /// every file.
    pub fn is_global_ignore(&self) -> bool {
        self.ignores.is_some()
            && self.files.is_none()
            && self.rules.is_empty()
            && self.language_options.is_none()
            && self.linter_options.is_none()
            && self.plugins.is_empty()
    }

    /// A global-ignore object for `patterns`.
    pub fn global_ignores(patterns: Vec<String>, base_path: Option<PathBuf>) -> Self {
        Self {
            ignores: Some(patterns),
            base_path,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LanguageOptions {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub globals: BTreeMap<String, GlobalAccess>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser_options: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LinterOptions {
    /// `true`, `false` or a severity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_unused_disable_directives: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_inline_config: Option<bool>,
}

impl LinterOptions {
    /// Severity level for unused disable directives, if set.
    pub fn unused_directive_level(&self) -> Result<Option<u8>, HostError> {
        match &self.report_unused_disable_directives {
            None => Ok(None),
            Some(Value::Bool(true)) => Ok(Some(1)),
            Some(Value::Bool(false)) => Ok(Some(0)),
            Some(value) => normalize_severity(value).map(Some).ok_or_else(|| {
                HostError::config(format!(
                    "Key \"linterOptions\": Key \"reportUnusedDisableDirectives\": Expected one of: \"error\", \"warn\", \"off\", 0, 1, 2, or a boolean (you passed {value})."
                ))
            }),
        }
    }
}

/// Whether a global may be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "Value")]
pub enum GlobalAccess {
    Readonly,
    Writable,
    Off,
}

impl TryFrom<Value> for GlobalAccess {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match &value {
            Value::Bool(true) => Ok(Self::Writable),
            Value::Bool(false) => Ok(Self::Readonly),
            Value::String(s) => match s.as_str() {
                "readonly" | "readable" => Ok(Self::Readonly),
                "writable" | "writeable" => Ok(Self::Writable),
                "off" => Ok(Self::Off),
                _ => Err(format!(
                    "'{s}' is not a valid configuration for a global (use 'readonly', 'writable', or 'off')"
                )),
            },
            other => Err(format!("'{other}' is not a valid configuration for a global")),
        }
    }
}

/// A rule's normalized configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSetting {
    /// `0`, `1` or `2`.
    pub level: u8,
    pub options: Vec<Value>,
}

impl RuleSetting {
    /// Parses a rule value: a severity, or an array starting with one.
    pub fn parse(rule_id: &str, value: &Value) -> Result<Self, HostError> {
        let (severity, options) = match value {
            Value::Array(items) if !items.is_empty() => (&items[0], items[1..].to_vec()),
            Value::Array(_) => {
                return Err(invalid_rule(rule_id, "Severity should be set", value));
            }
            other => (other, Vec::new()),
        };
        let level = normalize_severity(severity).ok_or_else(|| {
            invalid_rule(
                rule_id,
                "Severity should be one of the following: 0 = off, 1 = warn, 2 = error",
                severity,
            )
        })?;
        Ok(Self { level, options })
    }

    /// Applies a later setting on top of this one. A later setting without
    /// options keeps the earlier options.
    pub fn merge(&mut self, later: &RuleSetting) {
        self.level = later.level;
        if !later.options.is_empty() {
            self.options = later.options.clone();
        }
    }
}

fn invalid_rule(rule_id: &str, reason: &str, value: &Value) -> HostError {
    HostError::config(format!(
        "Configuration for rule \"{rule_id}\" is invalid:\n\t{reason} (you passed '{value}')."
    ))
}
