//! # lintpool_diagnostic
//!
//! Data model shared between the host linter, the parallel core and the CLI.
//!
//! - [`LintMessage`] / [`SuppressedMessage`]: what a rule reported
//! - [`LintResult`]: everything produced for a single file
//! - [`RuleMeta`]: rule metadata surfaced to formatters
//!
//! Results cross thread boundaries by value, so every type here is `Send`
//! and serializable with `serde`. The `rkyv` feature adds archive derives for
//! the parts that are persisted in the file-entry cache.

mod message;
mod meta;
mod result;
mod span;

pub use message::{
    Fix, LintMessage, Severity, SuppressedMessage, SuppressionKind, SuppressionRecord,
};
pub use meta::{FixableKind, RuleDocs, RuleMeta, RuleType, RulesMeta};
pub use result::{LintResult, LintStats, LintSummary, UsedDeprecatedRule};
pub use span::{LineIndex, Span};
