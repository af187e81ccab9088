//! The interface the parallel layer drives the host engine through.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintpool_cache::CacheManager;
use lintpool_diagnostic::{LintResult, RulesMeta};
use parking_lot::Mutex;
use tracing::warn;

use crate::HostError;
use crate::config::ConfigLoader;
use crate::helpers::get_shorthand_name;
use crate::options::{EngineOptions, FindFilesOptions};

/// File path reported for text linted without a file name.
pub const TEXT_PLACEHOLDER: &str = "<text>";

/// Non-fatal conditions the engine reports to its embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostWarning {
    /// A config file that contains no config objects.
    EmptyConfig { config_file: PathBuf },
    /// A legacy ignore file that is no longer read.
    LegacyIgnoreFile { path: PathBuf },
}

impl fmt::Display for HostWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostWarning::EmptyConfig { config_file } => write!(
                f,
                "Running lintpool with an empty config (from {}). Please double-check that this is what you want. If you want to run lintpool with an empty config, write [] to your config file.",
                config_file.display()
            ),
            HostWarning::LegacyIgnoreFile { path } => write!(
                f,
                "The \".lintpoolignore\" file ({}) is no longer supported. Switch to using the \"ignores\" property in \"lintpool.config.json\".",
                path.display()
            ),
        }
    }
}

type WarningSink = Arc<dyn Fn(HostWarning) + Send + Sync>;

/// Callbacks scoped to one engine.
#[derive(Clone, Default)]
pub struct EngineHooks {
    warning_sink: Option<WarningSink>,
}

impl EngineHooks {
    /// Routes warnings to `sink` instead of the log.
    pub fn with_warning_sink(mut self, sink: impl Fn(HostWarning) + Send + Sync + 'static) -> Self {
        self.warning_sink = Some(Arc::new(sink));
        self
    }

    pub fn emit(&self, warning: HostWarning) {
        match &self.warning_sink {
            Some(sink) => sink(warning),
            None => warn!("{}", warning),
        }
    }
}

impl fmt::Debug for EngineHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineHooks")
            .field("warning_sink", &self.warning_sink.is_some())
            .finish()
    }
}

/// A single-threaded lint engine.
pub trait HostEngine: Send + Sync {
    fn options(&self) -> &EngineOptions;

    /// Finds and lints every file matching `patterns`, updating the file
    /// cache when it is enabled.
    fn lint_files(&self, patterns: &[String]) -> Result<Vec<LintResult>, HostError>;

    /// Lints `text` as if it were the contents of `file_path`.
    fn lint_text(&self, text: &str, file_path: Option<&Path>) -> Result<Vec<LintResult>, HostError>;

    /// Lints one discovered file. Returns `None` for a file that is skipped
    /// without a report. Reads the file cache but never writes it.
    fn lint_file(&self, path: &Path) -> Result<Option<LintResult>, HostError>;

    fn find_files(&self, options: &FindFilesOptions) -> Result<Vec<PathBuf>, HostError>;

    fn config_loader(&self) -> &ConfigLoader;

    /// The file-entry cache, when caching is enabled.
    fn file_cache(&self) -> Option<&Mutex<CacheManager>>;

    /// Metadata for every rule that reported in `results`.
    fn rules_meta_for_results(&self, results: &[LintResult]) -> Result<RulesMeta, HostError>;

    /// Writes fixed output of `results` back to disk.
    fn output_fixes(&self, results: &[LintResult]) -> Result<(), HostError>;
}

/// Creates engines; each worker thread asks for its own.
pub trait HostFactory: Send + Sync {
    fn create_engine(
        &self,
        options: EngineOptions,
        hooks: EngineHooks,
    ) -> Result<Arc<dyn HostEngine>, HostError>;

    /// Resolves a plugin named on the command line to the short name its
    /// rules are addressed by.
    fn resolve_plugin(&self, name: &str, _relative_to: &Path) -> Result<String, HostError> {
        Ok(get_shorthand_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hooks_route_to_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hooks = EngineHooks::default().with_warning_sink(move |w| sink.lock().push(w));

        let cloned = hooks.clone();
        cloned.emit(HostWarning::EmptyConfig {
            config_file: PathBuf::from("/p/lintpool.config.json"),
        });

        assert_eq!(seen.lock().len(), 1);
        assert!(format!("{:?}", hooks).contains("true"));
    }

    #[test]
    fn test_warning_messages() {
        let empty = HostWarning::EmptyConfig {
            config_file: PathBuf::from("/p/lintpool.config.json"),
        };
        assert!(
            empty
                .to_string()
                .starts_with("Running lintpool with an empty config (from /p/lintpool.config.json)")
        );

        let legacy = HostWarning::LegacyIgnoreFile {
            path: PathBuf::from("/p/.lintpoolignore"),
        };
        assert!(legacy.to_string().contains("no longer supported"));
    }

    #[test]
    fn test_default_hooks_log() {
        EngineHooks::default().emit(HostWarning::LegacyIgnoreFile {
            path: PathBuf::from(".lintpoolignore"),
        });
    }
}
