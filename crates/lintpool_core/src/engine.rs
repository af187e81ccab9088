//! The engine the CLI drives: the host engine plus the worker pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintpool_cache::CacheManager;
use lintpool_diagnostic::{LintResult, RulesMeta};
use lintpool_host::{
    EngineHooks, EngineOptions, FindFilesOptions, HostEngine, HostError, HostFactory,
    resolve_cache_location, store_cached_results,
};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::concurrency::{available_parallelism, effective_workers, resolve_max_concurrency};
use crate::error::CoreError;
use crate::options::{CliOptions, ParallelOptions, translate_options};
use crate::scheduler::Scheduler;
use crate::warnings::EmptyConfigWarnings;

/// Parent-side state kept for the lifetime of one engine.
#[derive(Debug)]
struct EngineInfo {
    max_concurrency: usize,
    /// Rule metadata posted by workers, by file path.
    rules_meta_map: Mutex<HashMap<PathBuf, RulesMeta>>,
    warnings: Arc<EmptyConfigWarnings>,
}

/// Lints files on a pool of worker threads, each with its own host engine.
///
/// With a maximum concurrency of zero every call goes straight to the
/// host engine.
pub struct ParallelEngine {
    cli_options: CliOptions,
    factory: Arc<dyn HostFactory>,
    engine: Arc<dyn HostEngine>,
    parallel: ParallelOptions,
    info: EngineInfo,
}

impl ParallelEngine {
    /// Builds the parent engine. Warnings go to `hooks`; empty-config
    /// warnings are emitted once per config file across all workers.
    pub fn new(
        cli_options: CliOptions,
        factory: Arc<dyn HostFactory>,
        hooks: EngineHooks,
    ) -> Result<Self, CoreError> {
        let translated = translate_options(&cli_options, factory.as_ref())?;
        let max_concurrency =
            resolve_max_concurrency(translated.parallel.concurrency, available_parallelism());
        let warnings = Arc::new(EmptyConfigWarnings::new(hooks));
        let engine = factory.create_engine(translated.engine, warnings.parent_hooks())?;
        debug!("Maximum concurrency: {}", max_concurrency);

        Ok(Self {
            cli_options,
            factory,
            engine,
            parallel: translated.parallel,
            info: EngineInfo {
                max_concurrency,
                rules_meta_map: Mutex::new(HashMap::new()),
                warnings,
            },
        })
    }

    pub fn options(&self) -> &EngineOptions {
        self.engine.options()
    }

    pub fn parallel_options(&self) -> &ParallelOptions {
        &self.parallel
    }

    pub fn max_concurrency(&self) -> usize {
        self.info.max_concurrency
    }

    /// Finds and lints every file matching `patterns`.
    ///
    /// Results come back in discovery order. On failure nothing is
    /// returned and the file cache is left as it was.
    pub fn lint_files(&self, patterns: &[String]) -> Result<Vec<LintResult>, CoreError> {
        if self.info.max_concurrency == 0 {
            return Ok(self.engine.lint_files(patterns)?);
        }

        let options = self.engine.options();
        let patterns = if patterns.is_empty() {
            if options.pass_on_no_patterns {
                return Ok(Vec::new());
            }
            vec![".".to_string()]
        } else {
            patterns.to_vec()
        };

        self.prune_rules_meta();

        let cache = self.engine.file_cache();
        if cache.is_none() {
            CacheManager::remove_stale(&resolve_cache_location(&options.cache_location))
                .map_err(HostError::from)?;
        }

        let file_paths = self
            .engine
            .find_files(&FindFilesOptions::from_engine(options, &patterns))?;
        if file_paths.is_empty() {
            return Ok(Vec::new());
        }

        let scheduler = Scheduler {
            cli_options: &self.cli_options,
            factory: &self.factory,
            file_paths: &file_paths,
            loader: self.engine.config_loader(),
            warnings: &self.info.warnings,
            max_concurrency: self.info.max_concurrency,
        };
        let workers = effective_workers(self.info.max_concurrency, file_paths.len());
        let outcomes = scheduler.run(workers)?;

        let mut results = Vec::with_capacity(outcomes.len());
        {
            let mut rules_meta_map = self.info.rules_meta_map.lock();
            for outcome in outcomes {
                rules_meta_map.insert(outcome.result.file_path.clone(), outcome.rules_meta);
                results.push(outcome.result);
            }
        }

        if let Some(cache) = cache {
            store_cached_results(cache, self.engine.config_loader(), &results)?;
        }

        info!("Linted {} files", results.len());
        Ok(results)
    }

    /// Lints `text` on the parent engine.
    pub fn lint_text(
        &self,
        text: &str,
        file_path: Option<&Path>,
    ) -> Result<Vec<LintResult>, CoreError> {
        Ok(self.engine.lint_text(text, file_path)?)
    }

    /// Metadata for every rule that reported in `results`. Files linted by
    /// workers use the metadata the worker posted.
    pub fn rules_meta_for_results(&self, results: &[LintResult]) -> Result<RulesMeta, CoreError> {
        let mut merged = RulesMeta::new();
        let mut missing = Vec::new();
        {
            let rules_meta_map = self.info.rules_meta_map.lock();
            for result in results {
                match rules_meta_map.get(&result.file_path) {
                    Some(meta) => merged.extend(meta.iter().map(|(k, v)| (k.clone(), v.clone()))),
                    None => missing.push(result.clone()),
                }
            }
        }
        if !missing.is_empty() {
            merged.extend(self.engine.rules_meta_for_results(&missing)?);
        }
        Ok(merged)
    }

    /// Writes fixed output of `results` back to disk.
    pub fn output_fixes(&self, results: &[LintResult]) -> Result<(), CoreError> {
        Ok(self.engine.output_fixes(results)?)
    }

    /// Drops metadata for files whose config array is no longer cached.
    fn prune_rules_meta(&self) {
        let loader = self.engine.config_loader();
        self.info
            .rules_meta_map
            .lock()
            .retain(|path, _| loader.get_cached_config_array_for_file(path).is_some());
    }
}

impl std::fmt::Debug for ParallelEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelEngine")
            .field("cwd", &self.cli_options.cwd)
            .field("max_concurrency", &self.info.max_concurrency)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::Concurrency;
    use lintpool_host::LintpoolFactory;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn engine(cwd: &Path, concurrency: Option<Concurrency>) -> ParallelEngine {
        let mut cli = CliOptions::new(cwd);
        cli.concurrency = concurrency;
        build(cli)
    }

    fn build(cli: CliOptions) -> ParallelEngine {
        let factory = Arc::new(LintpoolFactory::default());
        ParallelEngine::new(cli, factory, EngineHooks::default()).unwrap()
    }

    fn write_config(dir: &Path, config: &str) {
        fs::write(dir.join("lintpool.config.json"), config).unwrap();
    }

    #[test]
    fn test_off_uses_sequential_path() {
        let temp = tempfile::tempdir().unwrap();
        write_config(temp.path(), r#"[{ "rules": { "semi": "error" } }]"#);
        fs::write(temp.path().join("a.js"), "let a = 1\n").unwrap();

        let engine = engine(temp.path(), Some(Concurrency::Off));
        assert_eq!(engine.max_concurrency(), 0);
        let results = engine.lint_files(&[]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].error_count, 1);
    }

    #[test]
    fn test_rules_meta_recorded_per_file() {
        let temp = tempfile::tempdir().unwrap();
        write_config(temp.path(), r#"[{ "rules": { "semi": "error", "no-var": "warn" } }]"#);
        fs::write(temp.path().join("a.js"), "let a = 1\n").unwrap();
        fs::write(temp.path().join("b.js"), "var b = 1;\n").unwrap();

        let engine = engine(temp.path(), Some(Concurrency::Fixed(2)));
        let results = engine.lint_files(&["a.js".to_string(), "b.js".to_string()]).unwrap();

        let map = engine.info.rules_meta_map.lock().clone();
        assert_eq!(map.len(), 2);
        assert!(map[&temp.path().join("a.js")].contains_key("semi"));
        assert!(map[&temp.path().join("b.js")].contains_key("no-var"));

        let merged = engine.rules_meta_for_results(&results).unwrap();
        assert_eq!(merged.keys().cloned().collect::<Vec<_>>(), vec!["no-var", "semi"]);
    }

    #[test]
    fn test_prune_drops_meta_after_loader_reset() {
        let temp = tempfile::tempdir().unwrap();
        write_config(temp.path(), r#"[{ "rules": { "semi": "error" } }]"#);
        fs::write(temp.path().join("a.js"), "let a = 1\n").unwrap();

        let engine = engine(temp.path(), Some(Concurrency::Fixed(2)));
        engine.lint_files(&[]).unwrap();
        assert_eq!(engine.info.rules_meta_map.lock().len(), 1);

        engine.engine.config_loader().reset();
        engine.prune_rules_meta();
        assert!(engine.info.rules_meta_map.lock().is_empty());
    }

    #[test]
    fn test_pass_on_no_patterns() {
        let temp = tempfile::tempdir().unwrap();
        let mut cli = CliOptions::new(temp.path());
        cli.concurrency = Some(Concurrency::Fixed(2));
        cli.pass_on_no_patterns = true;
        let engine = build(cli);

        assert!(engine.lint_files(&[]).unwrap().is_empty());
    }
}
