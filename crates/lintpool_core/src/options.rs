//! Command-line options and their translation into engine options.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lintpool_cache::CacheStrategy;
use lintpool_diagnostic::RuleType;
use lintpool_host::config::{GlobalAccess, LanguageOptions, LinterOptions};
use lintpool_host::helpers::{is_array_of_non_empty_string, normalize_severity};
use lintpool_host::{
    ConfigObject, DEFAULT_CACHE_FILE, EngineOptions, FixMode, HostFactory, OverrideConfigFile,
    RuleFilter,
};
use serde_json::{Map, Value};

use crate::concurrency::Concurrency;
use crate::error::CoreError;

/// Default suppressions file, relative to the working directory.
pub const DEFAULT_SUPPRESSIONS_FILE: &str = "lintpool-suppressions.json";

/// The parsed command-line option bag.
///
/// Workers receive a clone and translate it themselves, so everything an
/// engine needs must be derivable from this value alone.
#[derive(Debug, Clone)]
pub struct CliOptions {
    /// Absolute working directory.
    pub cwd: PathBuf,
    pub config: Option<PathBuf>,
    pub config_lookup: bool,
    /// Config objects supplied by an embedder. When non-empty, no override
    /// object is synthesized from the flags below.
    pub override_config: Vec<ConfigObject>,
    /// `name[:true]` entries, each possibly comma-separated.
    pub global: Vec<String>,
    pub parser: Option<String>,
    /// `key:value` entries; values are JSON or plain strings.
    pub parser_options: Vec<String>,
    /// `<id>:<value>` entries.
    pub rule: Vec<String>,
    pub plugin: Vec<String>,
    pub resolve_plugins_relative_to: Option<PathBuf>,
    pub ignore: bool,
    pub ignore_pattern: Vec<String>,
    pub quiet: bool,
    /// `-1` means unbounded.
    pub max_warnings: i64,
    pub fix: bool,
    pub fix_dry_run: bool,
    pub fix_type: Vec<String>,
    pub cache: bool,
    pub cache_location: Option<PathBuf>,
    pub cache_strategy: Option<String>,
    pub inline_config: bool,
    pub report_unused_disable_directives: Option<String>,
    pub error_on_unmatched_pattern: bool,
    pub glob_input_paths: bool,
    pub warn_ignored: bool,
    pub pass_on_no_patterns: bool,
    pub stats: bool,
    pub concurrency: Option<Concurrency>,
    pub suppress_all: bool,
    pub suppress_rule: Vec<String>,
    pub prune_suppressions: bool,
    pub pass_on_unpruned_suppressions: bool,
    pub suppressions_location: Option<PathBuf>,
}

impl CliOptions {
    /// Options equivalent to running the command with no flags in `cwd`.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            config: None,
            config_lookup: true,
            override_config: Vec::new(),
            global: Vec::new(),
            parser: None,
            parser_options: Vec::new(),
            rule: Vec::new(),
            plugin: Vec::new(),
            resolve_plugins_relative_to: None,
            ignore: true,
            ignore_pattern: Vec::new(),
            quiet: false,
            max_warnings: -1,
            fix: false,
            fix_dry_run: false,
            fix_type: Vec::new(),
            cache: false,
            cache_location: None,
            cache_strategy: None,
            inline_config: true,
            report_unused_disable_directives: None,
            error_on_unmatched_pattern: true,
            glob_input_paths: true,
            warn_ignored: true,
            pass_on_no_patterns: false,
            stats: false,
            concurrency: None,
            suppress_all: false,
            suppress_rule: Vec::new(),
            prune_suppressions: false,
            pass_on_unpruned_suppressions: false,
            suppressions_location: None,
        }
    }
}

/// Options only the parallel layer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelOptions {
    pub concurrency: Option<Concurrency>,
    /// Absolute location of the suppressions file.
    pub suppressions_location: PathBuf,
    /// Whether the location was given explicitly.
    pub suppressions_location_explicit: bool,
    pub suppress_all: bool,
    pub suppress_rule: Vec<String>,
    pub prune_suppressions: bool,
    pub pass_on_unpruned_suppressions: bool,
}

/// The result of [`translate_options`].
#[derive(Debug, Clone)]
pub struct TranslatedOptions {
    pub engine: EngineOptions,
    pub parallel: ParallelOptions,
}

/// Converts the command-line option bag into host engine options plus the
/// options of the parallel layer.
///
/// `factory` resolves `--plugin` names to the short names their rules are
/// addressed by.
pub fn translate_options(
    cli: &CliOptions,
    factory: &dyn HostFactory,
) -> Result<TranslatedOptions, CoreError> {
    let cwd = cli.cwd.clone();
    let mut engine = EngineOptions::new(&cwd);

    engine.override_config_file = match (&cli.config, cli.config_lookup) {
        (Some(path), _) => OverrideConfigFile::Path(cwd.join(path)),
        (None, false) => OverrideConfigFile::NoLookup,
        (None, true) => OverrideConfigFile::Unset,
    };

    engine.override_config = if cli.override_config.is_empty() {
        override_object(cli, factory)?.into_iter().collect()
    } else {
        cli.override_config.clone()
    };

    if !is_array_of_non_empty_string(&cli.ignore_pattern) {
        return Err(CoreError::invalid_option(
            "Invalid Options: 'ignorePattern' must be an array of non-empty strings.",
        ));
    }
    engine.ignore = cli.ignore;
    engine.ignore_patterns = cli.ignore_pattern.clone();

    engine.fix = match (cli.fix || cli.fix_dry_run, cli.quiet) {
        (false, _) => FixMode::Off,
        (true, false) => FixMode::All,
        (true, true) => FixMode::ErrorsOnly,
    };
    engine.fix_types = parse_fix_types(&cli.fix_type)?;
    engine.rule_filter = if cli.quiet && cli.max_warnings == -1 {
        RuleFilter::ErrorsOnly
    } else {
        RuleFilter::All
    };

    engine.allow_inline_config = cli.inline_config;
    engine.cache = cli.cache;
    engine.cache_location = cli
        .cache_location
        .as_ref()
        .map(|path| cwd.join(path))
        .unwrap_or_else(|| cwd.join(DEFAULT_CACHE_FILE));
    if let Some(strategy) = &cli.cache_strategy {
        engine.cache_strategy = CacheStrategy::parse(strategy).ok_or_else(|| {
            CoreError::invalid_option(format!(
                "Option cache-strategy: '{strategy}' is not one of \"metadata\" or \"content\"."
            ))
        })?;
    }
    engine.error_on_unmatched_pattern = cli.error_on_unmatched_pattern;
    engine.glob_input_paths = cli.glob_input_paths;
    engine.warn_ignored = cli.warn_ignored;
    engine.pass_on_no_patterns = cli.pass_on_no_patterns;
    engine.stats = cli.stats;
    engine.resolve_plugins_relative_to = cli.resolve_plugins_relative_to.clone();

    let parallel = ParallelOptions {
        concurrency: cli.concurrency,
        suppressions_location: cwd.join(
            cli.suppressions_location
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_SUPPRESSIONS_FILE)),
        ),
        suppressions_location_explicit: cli.suppressions_location.is_some(),
        suppress_all: cli.suppress_all,
        suppress_rule: cli.suppress_rule.clone(),
        prune_suppressions: cli.prune_suppressions,
        pass_on_unpruned_suppressions: cli.pass_on_unpruned_suppressions,
    };

    Ok(TranslatedOptions { engine, parallel })
}

/// Builds the config object carrying rule, plugin, global and parser flags,
/// or `None` when no such flag was given.
fn override_object(
    cli: &CliOptions,
    factory: &dyn HostFactory,
) -> Result<Option<ConfigObject>, CoreError> {
    let has_overrides = cli.parser.is_some()
        || !cli.parser_options.is_empty()
        || !cli.plugin.is_empty()
        || !cli.rule.is_empty()
        || !cli.global.is_empty()
        || cli.report_unused_disable_directives.is_some();
    if !has_overrides {
        return Ok(None);
    }

    let globals = parse_globals(&cli.global);
    let parser_options = parse_parser_options(&cli.parser_options)?;
    let language_options = (!globals.is_empty() || cli.parser.is_some() || parser_options.is_some())
        .then(|| LanguageOptions {
            globals,
            parser: cli.parser.clone(),
            parser_options,
        });

    let linter_options = cli
        .report_unused_disable_directives
        .as_deref()
        .map(|severity| {
            let level = normalize_severity(&Value::String(severity.to_string())).ok_or_else(|| {
                CoreError::invalid_option(format!(
                    "Option report-unused-disable-directives: '{severity}' is not a valid severity. Use \"off\", \"warn\" or \"error\"."
                ))
            })?;
            Ok::<_, CoreError>(LinterOptions {
                report_unused_disable_directives: Some(Value::from(level)),
                no_inline_config: None,
            })
        })
        .transpose()?;

    let relative_to = cli
        .resolve_plugins_relative_to
        .as_ref()
        .map(|path| cli.cwd.join(path))
        .unwrap_or_else(|| cli.cwd.clone());
    let plugins = cli
        .plugin
        .iter()
        .map(|name| factory.resolve_plugin(name, &relative_to))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(ConfigObject {
        rules: parse_rules(&cli.rule)?,
        language_options,
        linter_options,
        plugins,
        ..ConfigObject::default()
    }))
}

/// Parses `--global` entries. A trailing `:true` makes a global writable.
pub fn parse_globals(entries: &[String]) -> BTreeMap<String, GlobalAccess> {
    entries
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, flag)) => {
                let access = if flag.trim() == "true" {
                    GlobalAccess::Writable
                } else {
                    GlobalAccess::Readonly
                };
                (name.trim().to_string(), access)
            }
            None => (entry.to_string(), GlobalAccess::Readonly),
        })
        .collect()
}

/// Parses `--rule` entries into normalized rule values.
pub fn parse_rules(entries: &[String]) -> Result<BTreeMap<String, Value>, CoreError> {
    let mut rules = BTreeMap::new();
    for entry in entries {
        let (id, raw) = entry.split_once(':').ok_or_else(|| {
            CoreError::invalid_option(format!(
                "Invalid value for option 'rule': '{entry}'. Expected '<rule-id>:<value>'."
            ))
        })?;
        let id = id.trim();
        let raw = raw.trim();
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));

        let invalid = || {
            CoreError::invalid_option(format!(
                "Invalid severity for rule '{id}': {raw}. Use \"off\", \"warn\", \"error\", 0, 1 or 2."
            ))
        };
        let normalized = match value {
            Value::Array(mut items) if !items.is_empty() => {
                let level = normalize_severity(&items[0]).ok_or_else(invalid)?;
                items[0] = Value::from(level);
                Value::Array(items)
            }
            other => Value::from(normalize_severity(&other).ok_or_else(invalid)?),
        };
        rules.insert(id.to_string(), normalized);
    }
    Ok(rules)
}

fn parse_parser_options(entries: &[String]) -> Result<Option<Value>, CoreError> {
    if entries.is_empty() {
        return Ok(None);
    }
    let mut options = Map::new();
    for entry in entries {
        let (key, raw) = entry.split_once(':').ok_or_else(|| {
            CoreError::invalid_option(format!(
                "Invalid value for option 'parser-options': '{entry}'. Expected '<key>:<value>'."
            ))
        })?;
        let raw = raw.trim();
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        options.insert(key.trim().to_string(), value);
    }
    Ok(Some(Value::Object(options)))
}

fn parse_fix_types(values: &[String]) -> Result<Option<Vec<RuleType>>, CoreError> {
    if values.is_empty() {
        return Ok(None);
    }
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(|value| {
            RuleType::parse(value.trim()).ok_or_else(|| {
                CoreError::invalid_option(format!(
                    "Invalid Options: '{value}' is not a valid fix type. Use \"directive\", \"problem\", \"suggestion\" or \"layout\"."
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
