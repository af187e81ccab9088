//! Engine constructor options.

use std::path::PathBuf;

use lintpool_cache::CacheStrategy;
use lintpool_diagnostic::{LintMessage, RuleType, Severity};

use crate::HostError;
use crate::config::ConfigObject;
use crate::helpers::is_array_of_non_empty_string;

/// Where the engine gets its configuration file from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverrideConfigFile {
    /// Look up `lintpool.config.json` from each file's directory.
    #[default]
    Unset,
    /// Use exactly this file for every linted file.
    Path(PathBuf),
    /// Use no configuration file at all.
    NoLookup,
}

/// Which messages may be auto-fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FixMode {
    #[default]
    Off,
    All,
    /// Only messages of error severity (`--quiet --fix`).
    ErrorsOnly,
}

impl FixMode {
    pub fn is_enabled(self) -> bool {
        !matches!(self, FixMode::Off)
    }
}

/// Which configured rules are run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleFilter {
    #[default]
    All,
    /// Rules configured at warning severity are skipped entirely.
    ErrorsOnly,
}

impl RuleFilter {
    /// Returns true if a rule configured at `level` should run.
    pub fn allows(self, level: u8) -> bool {
        match self {
            RuleFilter::All => level > 0,
            RuleFilter::ErrorsOnly => level == 2,
        }
    }
}

/// Options the host engine is constructed with.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Absolute working directory. Relative paths resolve against it.
    pub cwd: PathBuf,
    pub override_config_file: OverrideConfigFile,
    /// Config objects appended after the config file, highest precedence.
    pub override_config: Vec<ConfigObject>,
    /// Whether ignore patterns apply at all.
    pub ignore: bool,
    /// Extra global ignore patterns, relative to `cwd`.
    pub ignore_patterns: Vec<String>,
    pub fix: FixMode,
    /// Restricts fixing to rules of these types.
    pub fix_types: Option<Vec<RuleType>>,
    pub allow_inline_config: bool,
    pub cache: bool,
    pub cache_location: PathBuf,
    pub cache_strategy: CacheStrategy,
    pub error_on_unmatched_pattern: bool,
    pub glob_input_paths: bool,
    pub pass_on_no_patterns: bool,
    pub warn_ignored: bool,
    pub rule_filter: RuleFilter,
    pub stats: bool,
    /// Directory plugins named on the command line are resolved from.
    pub resolve_plugins_relative_to: Option<PathBuf>,
}

impl EngineOptions {
    /// Creates default options rooted at `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        Self {
            cache_location: cwd.join(".lintpoolcache"),
            cwd,
            override_config_file: OverrideConfigFile::Unset,
            override_config: Vec::new(),
            ignore: true,
            ignore_patterns: Vec::new(),
            fix: FixMode::Off,
            fix_types: None,
            allow_inline_config: true,
            cache: false,
            cache_strategy: CacheStrategy::Metadata,
            error_on_unmatched_pattern: true,
            glob_input_paths: true,
            pass_on_no_patterns: false,
            warn_ignored: true,
            rule_filter: RuleFilter::All,
            stats: false,
            resolve_plugins_relative_to: None,
        }
    }

    /// Checks option combinations the engine cannot work with.
    pub fn validate(&self) -> Result<(), HostError> {
        if !self.cwd.is_absolute() {
            return Err(HostError::invalid_options(format!(
                "'cwd' must be an absolute path: {}",
                self.cwd.display()
            )));
        }
        if !is_array_of_non_empty_string(&self.ignore_patterns) {
            return Err(HostError::invalid_options(
                "'ignorePatterns' must be an array of non-empty strings",
            ));
        }
        if matches!(&self.fix_types, Some(types) if types.is_empty()) {
            return Err(HostError::invalid_options(
                "'fixTypes' must be a non-empty array",
            ));
        }
        Ok(())
    }

    /// Returns true if `message`, reported by a rule of `rule_type`, may be
    /// fixed under these options.
    pub fn should_fix(&self, message: &LintMessage, rule_type: Option<RuleType>) -> bool {
        let severity_ok = match self.fix {
            FixMode::Off => false,
            FixMode::All => true,
            FixMode::ErrorsOnly => message.severity == Severity::Error,
        };
        if !severity_ok {
            return false;
        }
        match (&self.fix_types, rule_type) {
            (None, _) => true,
            (Some(types), Some(rule_type)) => types.contains(&rule_type),
            (Some(_), None) => false,
        }
    }
}

/// Options for [`crate::HostEngine::find_files`].
#[derive(Debug, Clone)]
pub struct FindFilesOptions {
    pub patterns: Vec<String>,
    pub cwd: PathBuf,
    pub glob_input_paths: bool,
    pub error_on_unmatched_pattern: bool,
}

impl FindFilesOptions {
    /// Builds find options for `patterns` from engine options.
    pub fn from_engine(options: &EngineOptions, patterns: &[String]) -> Self {
        Self {
            patterns: patterns.to_vec(),
            cwd: options.cwd.clone(),
            glob_input_paths: options.glob_input_paths,
            error_on_unmatched_pattern: options.error_on_unmatched_pattern,
        }
    }
}
