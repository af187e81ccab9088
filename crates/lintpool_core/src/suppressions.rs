//! The suppressions file: recorded error counts per file and rule.
//!
//! A stored count `C` for `(file, rule)` hides up to `C` error messages of
//! that rule in that file. Counts are rewritten by `--suppress-all`,
//! `--suppress-rule` and `--prune-suppressions`; a normal run only reads
//! them and reports counts that no longer match anything.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use lintpool_diagnostic::{LintResult, SuppressedMessage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::CoreError;
use crate::options::ParallelOptions;

/// Printed when a normal run leaves stored counts unmatched.
pub const UNUSED_SUPPRESSIONS_MESSAGE: &str =
    "There are suppressions left that do not occur anymore. Consider re-running the command with `--prune-suppressions`.";

/// The stored count for one file and rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSuppression {
    pub count: usize,
}

/// The whole suppressions file: file key, then rule id.
pub type SuppressedViolations = BTreeMap<String, BTreeMap<String, RuleSuppression>>;

/// Stored counts that matched no message, by file key and rule id.
pub type UnusedSuppressions = BTreeMap<String, BTreeMap<String, usize>>;

/// How a run treats the suppressions file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SuppressionMode {
    /// Apply stored counts; never add new ones.
    #[default]
    Report,
    /// Record every current error.
    SuppressAll,
    /// Record current errors of these rules.
    SuppressRules(BTreeSet<String>),
    /// Shrink stored counts to current errors.
    Prune,
}

impl SuppressionMode {
    /// Picks the mode from the mutually exclusive flags. Write modes cannot
    /// be combined with text read from stdin.
    pub fn from_options(options: &ParallelOptions, stdin: bool) -> Result<Self, CoreError> {
        let suppress_rule = !options.suppress_rule.is_empty();
        let conflict = match (options.suppress_all, suppress_rule, options.prune_suppressions) {
            (true, true, _) => Some(("--suppress-all", "--suppress-rule")),
            (true, _, true) => Some(("--suppress-all", "--prune-suppressions")),
            (_, true, true) => Some(("--suppress-rule", "--prune-suppressions")),
            _ => None,
        };
        if let Some((first, second)) = conflict {
            return Err(CoreError::invalid_option(format!(
                "The {first} option and the {second} option cannot be used together."
            )));
        }

        let mode = if options.suppress_all {
            Self::SuppressAll
        } else if suppress_rule {
            Self::SuppressRules(options.suppress_rule.iter().cloned().collect())
        } else if options.prune_suppressions {
            Self::Prune
        } else {
            Self::Report
        };

        if stdin && mode.is_write() {
            return Err(CoreError::invalid_option(
                "The --suppress-all, --suppress-rule, and --prune-suppressions options cannot be used with piped-in code.",
            ));
        }
        Ok(mode)
    }

    /// True for the modes that rewrite the suppressions file.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Report)
    }

    /// The count to keep for a rule with stored count `stored` and
    /// `current` errors in this run.
    fn next_count(&self, rule_id: &str, stored: usize, current: usize) -> usize {
        match self {
            Self::SuppressAll => current,
            Self::SuppressRules(rules) if rules.contains(rule_id) => current,
            Self::Prune => stored.min(current),
            Self::SuppressRules(_) | Self::Report => stored,
        }
    }
}

/// Loads, applies and saves the suppressions file for one run.
#[derive(Debug)]
pub struct SuppressionsService {
    location: PathBuf,
    cwd: PathBuf,
    mode: SuppressionMode,
    violations: SuppressedViolations,
    /// Whether the file existed when loaded.
    existed: bool,
    /// Serialization of the file as loaded.
    loaded: String,
}

impl SuppressionsService {
    /// Loads the suppressions file named by `options`.
    ///
    /// A missing file is an empty database, except when pruning or when
    /// a normal run was pointed at it explicitly.
    pub fn load(
        options: &ParallelOptions,
        mode: SuppressionMode,
        cwd: &Path,
    ) -> Result<Self, CoreError> {
        let location = options.suppressions_location.clone();
        let (violations, existed) = match fs::read_to_string(&location) {
            Ok(content) => {
                let violations: SuppressedViolations = serde_json::from_str(&content)
                    .map_err(|source| CoreError::SuppressionsParse {
                        path: location.clone(),
                        source,
                    })?;
                debug!("Loaded suppressions for {} files", violations.len());
                (violations, true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let required = match mode {
                    SuppressionMode::Prune => true,
                    SuppressionMode::Report => options.suppressions_location_explicit,
                    SuppressionMode::SuppressAll | SuppressionMode::SuppressRules(_) => false,
                };
                if required {
                    return Err(CoreError::SuppressionsMissing(location));
                }
                (SuppressedViolations::new(), false)
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            loaded: serialize_violations(&violations)?,
            location,
            cwd: cwd.to_path_buf(),
            mode,
            violations,
            existed,
        })
    }

    pub fn mode(&self) -> &SuppressionMode {
        &self.mode
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn violations(&self) -> &SuppressedViolations {
        &self.violations
    }

    /// The key `file_path` is stored under: relative to the working
    /// directory, with forward slashes.
    pub fn file_key(&self, file_path: &Path) -> String {
        file_path
            .strip_prefix(&self.cwd)
            .unwrap_or(file_path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Moves suppressed errors out of `messages` in every result and
    /// updates the stored counts for the current mode.
    pub fn apply(&mut self, results: &mut [LintResult]) -> UnusedSuppressions {
        let mut unused = UnusedSuppressions::new();

        for result in results.iter_mut() {
            let key = self.file_key(&result.file_path);
            let stored = self.violations.get(&key).cloned().unwrap_or_default();
            let records = matches!(
                self.mode,
                SuppressionMode::SuppressAll | SuppressionMode::SuppressRules(_)
            );
            if stored.is_empty() && !records {
                continue;
            }

            let partition = partition_result(result, &stored, &self.mode);
            if partition.kept.is_empty() {
                self.violations.remove(&key);
            } else {
                self.violations.insert(key.clone(), partition.kept);
            }
            if !partition.unused.is_empty() {
                unused.insert(key, partition.unused);
            }
        }

        unused
    }

    /// Writes the file when the mode rewrites it, or when a normal run
    /// changed an existing file. Returns whether it was written.
    pub fn save_if_needed(&self) -> Result<bool, CoreError> {
        let serialized = serialize_violations(&self.violations)?;
        let write = self.mode.is_write() || (self.existed && serialized != self.loaded);
        if !write {
            return Ok(false);
        }
        write_atomically(&self.location, &serialized)?;
        info!("Wrote suppressions to {}", self.location.display());
        Ok(true)
    }
}

/// How one file's messages split against its stored counts.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FilePartition {
    /// Counts to store for the file.
    pub kept: BTreeMap<String, RuleSuppression>,
    pub unused: BTreeMap<String, usize>,
}

/// Suppresses errors in `result` according to `stored` and `mode`, then
/// recounts it.
///
/// For each rule the first `min(errors, count)` errors, in message order,
/// move to `suppressed_messages`. Warnings and fatal errors always stay.
pub fn partition_result(
    result: &mut LintResult,
    stored: &BTreeMap<String, RuleSuppression>,
    mode: &SuppressionMode,
) -> FilePartition {
    let mut current: BTreeMap<String, usize> = BTreeMap::new();
    for message in result.messages.iter().filter(|m| m.is_suppressible()) {
        if let Some(rule_id) = &message.rule_id {
            *current.entry(rule_id.clone()).or_default() += 1;
        }
    }

    let rule_ids: BTreeSet<&String> = stored.keys().chain(current.keys()).collect();
    let mut partition = FilePartition::default();
    let mut to_suppress: BTreeMap<String, usize> = BTreeMap::new();

    for rule_id in rule_ids {
        let stored_count = stored.get(rule_id).map_or(0, |s| s.count);
        let current_count = current.get(rule_id).copied().unwrap_or(0);
        let next = mode.next_count(rule_id, stored_count, current_count);
        let suppress = current_count.min(next);

        if next > 0 {
            partition
                .kept
                .insert(rule_id.clone(), RuleSuppression { count: next });
        }
        if next > suppress {
            partition.unused.insert(rule_id.clone(), next - suppress);
        }
        if suppress > 0 {
            to_suppress.insert(rule_id.clone(), suppress);
        }
    }

    if !to_suppress.is_empty() {
        let messages = std::mem::take(&mut result.messages);
        for message in messages {
            let remaining = match &message.rule_id {
                Some(rule_id) if message.is_suppressible() => to_suppress.get_mut(rule_id),
                _ => None,
            };
            match remaining {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    result
                        .suppressed_messages
                        .push(SuppressedMessage::from_file(message));
                }
                _ => result.messages.push(message),
            }
        }
        result.recount();
    }

    partition
}

/// Serializes with sorted keys, two-space indentation and a trailing
/// newline.
pub fn serialize_violations(violations: &SuppressedViolations) -> Result<String, CoreError> {
    let mut serialized = serde_json::to_string_pretty(violations)
        .map_err(|e| CoreError::internal(format!("Failed to serialize suppressions: {e}")))?;
    serialized.push('\n');
    Ok(serialized)
}

/// Writes `content` to a sibling temp file, then renames it over `path`.
fn write_atomically(path: &Path, content: &str) -> Result<(), CoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    fs::write(&temp, content)?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e.into());
    }
    Ok(())
}
