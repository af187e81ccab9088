//! Cache entry types.

use std::path::PathBuf;

use lintpool_diagnostic::{LintMessage, LintResult, SuppressedMessage};

/// The persisted part of a [`LintResult`].
///
/// Counters are recomputed on restore; `source`, `stats` and
/// `used_deprecated_rules` are never stored.
#[derive(Debug, Clone, PartialEq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct CachedLintResult {
    pub messages: Vec<LintMessage>,
    pub suppressed_messages: Vec<SuppressedMessage>,
    pub output: Option<String>,
}

impl CachedLintResult {
    /// Captures the cacheable fields of `result`.
    pub fn from_result(result: &LintResult) -> Self {
        Self {
            messages: result.messages.clone(),
            suppressed_messages: result.suppressed_messages.clone(),
            output: result.output.clone(),
        }
    }

    /// Rebuilds a full result for `file_path`.
    pub fn into_result(self, file_path: impl Into<PathBuf>) -> LintResult {
        let mut result = LintResult::new(file_path);
        result.messages = self.messages;
        result.suppressed_messages = self.suppressed_messages;
        result.output = self.output;
        result.recount();
        result
    }

    /// True if the cached run reported anything that `--fix` could act on.
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }
}

/// What the cache knows about a file on disk at the time it was linted.
#[derive(Debug, Clone, Default, PartialEq, Eq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct FileFingerprint {
    /// File size in bytes.
    pub size: u64,
    /// Modification time in milliseconds since the Unix epoch.
    pub mtime_ms: u64,
    /// BLAKE3 hex digest of the content. Empty under the metadata strategy.
    pub content_hash: String,
}

/// A cache entry for a single file.
#[derive(Debug, Clone, PartialEq, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
pub struct CacheEntry {
    pub fingerprint: FileFingerprint,

    /// Hash of the resolved configuration used.
    pub config_hash: String,

    pub result: CachedLintResult,
}

impl CacheEntry {
    /// Creates a new cache entry.
    pub fn new(
        fingerprint: FileFingerprint,
        config_hash: String,
        result: CachedLintResult,
    ) -> Self {
        Self {
            fingerprint,
            config_hash,
            result,
        }
    }
}
