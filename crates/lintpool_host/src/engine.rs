//! The built-in [`HostEngine`] and its factory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintpool_cache::CacheManager;
use lintpool_diagnostic::{LintResult, RulesMeta};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::HostError;
use crate::api::{EngineHooks, HostEngine, HostFactory, HostWarning, TEXT_PLACEHOLDER};
use crate::config::{ConfigLoader, ConfigStatus, ResolvedConfig};
use crate::finder::find_files;
use crate::fixer::write_fixed_output;
use crate::helpers::create_ignore_result;
use crate::linter::Linter;
use crate::options::{EngineOptions, FindFilesOptions};
use crate::plugins::PluginRegistry;

/// Ignore file from older releases; its presence only triggers a warning.
pub const LEGACY_IGNORE_FILE: &str = ".lintpoolignore";

/// Default cache file name inside a cache directory.
pub const DEFAULT_CACHE_FILE: &str = ".lintpoolcache";

/// File name used to resolve config for text without a path.
const TEXT_CONFIG_PROBE: &str = "__placeholder__.js";

/// Lints files on the calling thread.
pub struct LintpoolEngine {
    options: EngineOptions,
    loader: Arc<ConfigLoader>,
    linter: Linter,
    cache: Option<Mutex<CacheManager>>,
}

impl LintpoolEngine {
    pub fn new(
        options: EngineOptions,
        hooks: EngineHooks,
        plugins: PluginRegistry,
    ) -> Result<Self, HostError> {
        options.validate()?;

        let legacy = options.cwd.join(LEGACY_IGNORE_FILE);
        if legacy.is_file() {
            hooks.emit(HostWarning::LegacyIgnoreFile { path: legacy });
        }

        let cache = if options.cache {
            let location = resolve_cache_location(&options.cache_location);
            Some(Mutex::new(CacheManager::open(
                location,
                options.cache_strategy,
            )?))
        } else {
            None
        };

        let loader = Arc::new(ConfigLoader::new(&options, hooks));

        Ok(Self {
            options,
            loader,
            linter: Linter::new(plugins),
            cache,
        })
    }

    pub fn linter(&self) -> &Linter {
        &self.linter
    }

    fn resolve_config(
        &self,
        path: &Path,
    ) -> Result<(ConfigStatus, Option<Arc<ResolvedConfig>>), HostError> {
        let array = self.loader.load_config_array_for_file(path)?;
        let status = array.get_config_status(path);
        Ok((status, array.get_config(path)))
    }

    fn ignore_result(&self, path: &Path, status: ConfigStatus) -> Option<LintResult> {
        self.options
            .warn_ignored
            .then(|| create_ignore_result(path, &self.options.cwd, status))
    }
}

impl HostEngine for LintpoolEngine {
    fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn lint_files(&self, patterns: &[String]) -> Result<Vec<LintResult>, HostError> {
        let patterns = if patterns.is_empty() {
            if self.options.pass_on_no_patterns {
                return Ok(Vec::new());
            }
            vec![".".to_string()]
        } else {
            patterns.to_vec()
        };

        if self.cache.is_none() {
            CacheManager::remove_stale(&resolve_cache_location(&self.options.cache_location))?;
        }

        let files = self.find_files(&FindFilesOptions::from_engine(&self.options, &patterns))?;

        let mut results = Vec::with_capacity(files.len());
        for file in &files {
            if let Some(result) = self.lint_file(file)? {
                results.push(result);
            }
        }

        if let Some(cache) = &self.cache {
            store_cached_results(cache, &self.loader, &results)?;
        }

        info!("Linted {} files", results.len());
        Ok(results)
    }

    fn lint_text(
        &self,
        text: &str,
        file_path: Option<&Path>,
    ) -> Result<Vec<LintResult>, HostError> {
        let Some(file_path) = file_path else {
            let probe = self.options.cwd.join(TEXT_CONFIG_PROBE);
            let (_, config) = self.resolve_config(&probe)?;
            let config = config.unwrap_or_default();
            let result =
                self.linter
                    .lint_text(text, Path::new(TEXT_PLACEHOLDER), &config, &self.options)?;
            return Ok(vec![result]);
        };

        let path = self.loader.absolute(file_path);
        let (status, config) = self.resolve_config(&path)?;
        match config {
            Some(config) if status == ConfigStatus::Matched => Ok(vec![
                self.linter.lint_text(text, &path, &config, &self.options)?,
            ]),
            _ => Ok(self.ignore_result(&path, status).into_iter().collect()),
        }
    }

    fn lint_file(&self, path: &Path) -> Result<Option<LintResult>, HostError> {
        let path = self.loader.absolute(path);
        let (status, config) = self.resolve_config(&path)?;
        let config = match config {
            Some(config) if status == ConfigStatus::Matched => config,
            _ => return Ok(self.ignore_result(&path, status)),
        };

        if let Some(cache) = &self.cache {
            let cached = cache.lock().get_cached_lint_results(&path, &config.hash());
            if let Some(cached) = cached
                && !(self.options.fix.is_enabled() && cached.has_messages())
            {
                debug!("Cache hit: {}", path.display());
                return Ok(Some(cached.into_result(&path)));
            }
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| HostError::file(format!("Failed to read {}: {}", path.display(), e)))?;
        debug!("Linting {}", path.display());
        self.linter
            .lint_text(&text, &path, &config, &self.options)
            .map(Some)
    }

    fn find_files(&self, options: &FindFilesOptions) -> Result<Vec<PathBuf>, HostError> {
        find_files(options, &self.loader)
    }

    fn config_loader(&self) -> &ConfigLoader {
        &self.loader
    }

    fn file_cache(&self) -> Option<&Mutex<CacheManager>> {
        self.cache.as_ref()
    }

    fn rules_meta_for_results(&self, results: &[LintResult]) -> Result<RulesMeta, HostError> {
        let rule_ids: BTreeSet<&str> = results
            .iter()
            .flat_map(|result| {
                result
                    .messages
                    .iter()
                    .chain(result.suppressed_messages.iter().map(|s| &s.message))
            })
            .filter_map(|message| message.rule_id.as_deref())
            .collect();
        Ok(self.linter.rules_meta(rule_ids))
    }

    fn output_fixes(&self, results: &[LintResult]) -> Result<(), HostError> {
        for result in results {
            let Some(output) = &result.output else {
                continue;
            };
            if result.file_path == Path::new(TEXT_PLACEHOLDER) {
                continue;
            }
            write_fixed_output(&result.file_path, output)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LintpoolEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LintpoolEngine")
            .field("cwd", &self.options.cwd)
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

/// Stores `results` in the file cache, then drops entries for vanished files
/// and saves. Results without a matched config (ignore notices) and
/// results that were fixed are not cached.
pub fn store_cached_results(
    cache: &Mutex<CacheManager>,
    loader: &ConfigLoader,
    results: &[LintResult],
) -> Result<(), HostError> {
    let mut cache = cache.lock();
    for result in results {
        if result.output.is_some() {
            continue;
        }
        let array = match loader.get_cached_config_array_for_file(&result.file_path) {
            Some(array) => array,
            None => loader.load_config_array_for_file(&result.file_path)?,
        };
        if let Some(config) = array.get_config(&result.file_path) {
            cache.set_cached_lint_results(&result.file_path, &config.hash(), result);
        }
    }
    cache.reconcile()?;
    Ok(())
}

/// A directory cache location gets the default file name inside it.
pub fn resolve_cache_location(location: &Path) -> PathBuf {
    if location.is_dir() {
        location.join(DEFAULT_CACHE_FILE)
    } else {
        location.to_path_buf()
    }
}

/// Builds [`LintpoolEngine`]s sharing one plugin registry.
#[derive(Debug, Clone, Default)]
pub struct LintpoolFactory {
    plugins: PluginRegistry,
}

impl LintpoolFactory {
    pub fn new(plugins: PluginRegistry) -> Self {
        Self { plugins }
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }
}

impl HostFactory for LintpoolFactory {
    fn create_engine(
        &self,
        options: EngineOptions,
        hooks: EngineHooks,
    ) -> Result<Arc<dyn HostEngine>, HostError> {
        Ok(Arc::new(LintpoolEngine::new(
            options,
            hooks,
            self.plugins.clone(),
        )?))
    }

    fn resolve_plugin(&self, name: &str, relative_to: &Path) -> Result<String, HostError> {
        self.plugins.resolve(name, relative_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FixMode;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let temp = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = temp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        temp
    }

    fn engine(options: EngineOptions) -> LintpoolEngine {
        LintpoolEngine::new(options, EngineHooks::default(), PluginRegistry::default()).unwrap()
    }

    const CONFIG: &str = r#"[{ "rules": { "semi": "error" } }, { "ignores": ["vendor/"] }]"#;

    #[test]
    fn test_lint_files_in_order() {
        let temp = project(&[
            ("lintpool.config.json", CONFIG),
            ("a.js", "var x = 1"),
            ("b.js", "var y = 2;"),
        ]);
        let engine = engine(EngineOptions::new(temp.path()));

        let results = engine
            .lint_files(&["b.js".to_string(), "a.js".to_string()])
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file_path, temp.path().join("b.js"));
        assert_eq!(results[0].error_count, 0);
        assert_eq!(results[1].error_count, 1);
    }

    #[test]
    fn test_no_patterns() {
        let temp = project(&[("lintpool.config.json", CONFIG), ("a.js", "a();")]);
        let mut options = EngineOptions::new(temp.path());
        assert_eq!(engine(options.clone()).lint_files(&[]).unwrap().len(), 1);

        options.pass_on_no_patterns = true;
        assert!(engine(options).lint_files(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_explicit_ignored_file() {
        let temp = project(&[("lintpool.config.json", CONFIG), ("vendor/lib.js", "x")]);
        let mut options = EngineOptions::new(temp.path());

        let results = engine(options.clone())
            .lint_files(&["vendor/lib.js".to_string()])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].warning_count, 1);
        assert!(results[0].messages[0].message.contains("matching ignore pattern"));

        options.warn_ignored = false;
        let results = engine(options).lint_files(&["vendor/lib.js".to_string()]).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_lint_text() {
        let temp = project(&[("lintpool.config.json", CONFIG)]);
        let engine = engine(EngineOptions::new(temp.path()));

        let results = engine.lint_text("var x = 1", None).unwrap();
        assert_eq!(results[0].file_path, PathBuf::from(TEXT_PLACEHOLDER));
        assert_eq!(results[0].error_count, 1);

        let results = engine.lint_text("x", Some(Path::new("vendor/a.js"))).unwrap();
        assert_eq!(results[0].warning_count, 1);

        let results = engine.lint_text("x;", Some(Path::new("src/a.js"))).unwrap();
        assert_eq!(results[0].file_path, temp.path().join("src/a.js"));
        assert_eq!(results[0].error_count, 0);
    }

    #[test]
    fn test_fix_and_output_fixes() {
        let temp = project(&[("lintpool.config.json", CONFIG), ("a.js", "var x = 1\n")]);
        let mut options = EngineOptions::new(temp.path());
        options.fix = FixMode::All;
        let engine = engine(options);

        let results = engine.lint_files(&["a.js".to_string()]).unwrap();
        assert_eq!(results[0].output.as_deref(), Some("var x = 1;\n"));
        engine.output_fixes(&results).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("a.js")).unwrap(),
            "var x = 1;\n"
        );
    }

    #[test]
    fn test_cache_round_trip() {
        let temp = project(&[("lintpool.config.json", CONFIG), ("a.js", "var x = 1")]);
        let mut options = EngineOptions::new(temp.path());
        options.cache = true;

        let first = engine(options.clone()).lint_files(&["a.js".to_string()]).unwrap();
        assert!(temp.path().join(".lintpoolcache").exists());

        let second_engine = engine(options.clone());
        let cache = second_engine.file_cache().unwrap();
        assert_eq!(cache.lock().len(), 1);
        let second = second_engine.lint_files(&["a.js".to_string()]).unwrap();
        assert_eq!(second[0].messages, first[0].messages);
        assert_eq!(second[0].error_count, first[0].error_count);

        options.cache = false;
        engine(options).lint_files(&["a.js".to_string()]).unwrap();
        assert!(!temp.path().join(".lintpoolcache").exists());
    }

    #[test]
    fn test_rules_meta_for_results() {
        let temp = project(&[("lintpool.config.json", CONFIG), ("a.js", "var x = 1")]);
        let engine = engine(EngineOptions::new(temp.path()));
        let results = engine.lint_files(&["a.js".to_string()]).unwrap();

        let meta = engine.rules_meta_for_results(&results).unwrap();
        assert_eq!(meta.keys().collect::<Vec<_>>(), vec!["semi"]);
    }

    #[test]
    fn test_legacy_ignore_file_warning() {
        let temp = project(&[(".lintpoolignore", "dist\n")]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let hooks = EngineHooks::default().with_warning_sink(move |w| sink.lock().push(w));

        LintpoolFactory::default()
            .create_engine(EngineOptions::new(temp.path()), hooks)
            .unwrap();
        assert!(matches!(
            seen.lock().as_slice(),
            [HostWarning::LegacyIgnoreFile { .. }]
        ));
    }

    #[test]
    fn test_factory_resolves_registered_plugins() {
        let factory = LintpoolFactory::new(PluginRegistry::new().with_plugin(
            crate::plugins::Plugin::new("eslint-plugin-custom"),
        ));
        assert_eq!(
            factory.resolve_plugin("eslint-plugin-custom", Path::new("/p")).unwrap(),
            "custom"
        );
        assert!(matches!(
            factory.resolve_plugin("missing", Path::new("/p")),
            Err(HostError::Plugin(_))
        ));
    }

    #[test]
    fn test_invalid_options_fail_construction() {
        let result = LintpoolFactory::default()
            .create_engine(EngineOptions::new("relative"), EngineHooks::default());
        assert!(matches!(result, Err(HostError::InvalidOptions(_))));
    }
}
