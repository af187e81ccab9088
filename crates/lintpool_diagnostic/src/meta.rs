//! Rule metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rule metadata keyed by rule id, as surfaced to formatters.
pub type RulesMeta = BTreeMap<String, RuleMeta>;

/// The category a rule belongs to. Used by `--fix-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Problem,
    Suggestion,
    Layout,
    Directive,
}

impl RuleType {
    /// Parses a `--fix-type` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "problem" => Some(Self::Problem),
            "suggestion" => Some(Self::Suggestion),
            "layout" => Some(Self::Layout),
            "directive" => Some(Self::Directive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::Suggestion => "suggestion",
            Self::Layout => "layout",
            Self::Directive => "directive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixableKind {
    Code,
    Whitespace,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDocs {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Metadata describing a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMeta {
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    #[serde(default)]
    pub docs: RuleDocs,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixable: Option<FixableKind>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    /// Rule ids that supersede this one when deprecated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replaced_by: Vec<String>,
}

impl RuleMeta {
    /// Creates metadata for a non-fixable, non-deprecated rule.
    pub fn new(rule_type: RuleType, description: impl Into<String>) -> Self {
        Self {
            rule_type,
            docs: RuleDocs {
                description: description.into(),
                url: None,
            },
            fixable: None,
            deprecated: false,
            replaced_by: Vec::new(),
        }
    }

    pub fn fixable(mut self, kind: FixableKind) -> Self {
        self.fixable = Some(kind);
        self
    }

    pub fn deprecated(mut self, replaced_by: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.deprecated = true;
        self.replaced_by = replaced_by.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.docs.url = Some(url.into());
        self
    }

    pub fn is_fixable(&self) -> bool {
        self.fixable.is_some()
    }
}
