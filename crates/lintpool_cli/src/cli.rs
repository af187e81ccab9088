//! CLI argument definitions

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use lintpool_core::{CliOptions, Concurrency};

/// lintpool - JavaScript linter with parallel workers and a suppressions file
#[derive(Parser, Debug)]
#[command(name = "lintpool")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files, directories or glob patterns to lint
    pub patterns: Vec<String>,

    /// Use this configuration instead of lintpool.config.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not look up lintpool.config.json files
    #[arg(long)]
    pub no_config_lookup: bool,

    /// Define global variables, `name` or `name:true` for writable
    #[arg(long, value_name = "NAME")]
    pub global: Vec<String>,

    /// Parser name recorded in the override config
    #[arg(long)]
    pub parser: Option<String>,

    /// Parser option as `key:value`
    #[arg(long, value_name = "KEY:VALUE")]
    pub parser_options: Vec<String>,

    /// Rule override as `<rule-id>:<severity or JSON>`
    #[arg(long, value_name = "RULE")]
    pub rule: Vec<String>,

    /// Plugin to load
    #[arg(long)]
    pub plugin: Vec<String>,

    /// Directory plugins are resolved from
    #[arg(long, value_name = "PATH")]
    pub resolve_plugins_relative_to: Option<PathBuf>,

    /// Disable ignore files and patterns
    #[arg(long)]
    pub no_ignore: bool,

    /// Additional ignore pattern
    #[arg(long, value_name = "PATTERN")]
    pub ignore_pattern: Vec<String>,

    /// Lint code provided on stdin
    #[arg(long)]
    pub stdin: bool,

    /// File name used for code provided on stdin
    #[arg(long, value_name = "PATH", requires = "stdin")]
    pub stdin_filename: Option<PathBuf>,

    /// Report errors only
    #[arg(long)]
    pub quiet: bool,

    /// Number of warnings that triggers a failing exit code
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub max_warnings: i64,

    /// Fix problems and write the fixed files
    #[arg(long)]
    pub fix: bool,

    /// Fix problems without writing files
    #[arg(long)]
    pub fix_dry_run: bool,

    /// Types of fixes to apply (problem, suggestion, layout, directive)
    #[arg(long, value_delimiter = ',')]
    pub fix_type: Vec<String>,

    /// Only check changed files
    #[arg(long)]
    pub cache: bool,

    /// Path to the cache file or directory
    #[arg(long, value_name = "PATH")]
    pub cache_location: Option<PathBuf>,

    /// How changed files are detected (metadata or content)
    #[arg(long, value_name = "STRATEGY")]
    pub cache_strategy: Option<String>,

    /// Ignore inline eslint-disable comments
    #[arg(long)]
    pub no_inline_config: bool,

    /// Report unused eslint-disable comments as errors
    #[arg(long)]
    pub report_unused_disable_directives: bool,

    /// Severity for unused eslint-disable comments (off, warn, error)
    #[arg(long, value_name = "SEVERITY", conflicts_with = "report_unused_disable_directives")]
    pub report_unused_disable_directives_severity: Option<String>,

    /// Do not fail when a pattern matches no files
    #[arg(long)]
    pub no_error_on_unmatched_pattern: bool,

    /// Do not warn about explicitly passed ignored files
    #[arg(long)]
    pub no_warn_ignored: bool,

    /// Exit successfully when no patterns are given
    #[arg(long)]
    pub pass_on_no_patterns: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Stylish)]
    pub format: OutputFormat,

    /// Write the report to this file
    #[arg(short, long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Add fix passes and rule timings to results
    #[arg(long)]
    pub stats: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Number of worker threads: a positive number, auto or off
    #[arg(long, value_name = "N", value_parser = parse_concurrency)]
    pub concurrency: Option<Concurrency>,

    /// Record every current error in the suppressions file
    #[arg(long)]
    pub suppress_all: bool,

    /// Record current errors of this rule in the suppressions file
    #[arg(long, value_name = "RULE")]
    pub suppress_rule: Vec<String>,

    /// Remove suppressions that no longer occur
    #[arg(long)]
    pub prune_suppressions: bool,

    /// Do not fail when suppressions no longer occur
    #[arg(long)]
    pub pass_on_unpruned_suppressions: bool,

    /// Path to the suppressions file
    #[arg(long, value_name = "PATH")]
    pub suppressions_location: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Stylish,
    Json,
    JsonWithMetadata,
}

fn parse_concurrency(value: &str) -> Result<Concurrency, String> {
    value.parse::<Concurrency>().map_err(|e| e.to_string())
}

impl Cli {
    /// The option bag the engine is built from.
    pub fn to_options(&self, cwd: &Path) -> CliOptions {
        let mut options = CliOptions::new(cwd);
        options.config = self.config.clone();
        options.config_lookup = !self.no_config_lookup;
        options.global = self.global.clone();
        options.parser = self.parser.clone();
        options.parser_options = self.parser_options.clone();
        options.rule = self.rule.clone();
        options.plugin = self.plugin.clone();
        options.resolve_plugins_relative_to = self.resolve_plugins_relative_to.clone();
        options.ignore = !self.no_ignore;
        options.ignore_pattern = self.ignore_pattern.clone();
        options.quiet = self.quiet;
        options.max_warnings = self.max_warnings;
        options.fix = self.fix;
        options.fix_dry_run = self.fix_dry_run;
        options.fix_type = self.fix_type.clone();
        options.cache = self.cache;
        options.cache_location = self.cache_location.clone();
        options.cache_strategy = self.cache_strategy.clone();
        options.inline_config = !self.no_inline_config;
        options.report_unused_disable_directives = if self.report_unused_disable_directives {
            Some("error".to_string())
        } else {
            self.report_unused_disable_directives_severity.clone()
        };
        options.error_on_unmatched_pattern = !self.no_error_on_unmatched_pattern;
        options.warn_ignored = !self.no_warn_ignored;
        options.pass_on_no_patterns = self.pass_on_no_patterns;
        options.stats = self.stats;
        options.concurrency = self.concurrency;
        options.suppress_all = self.suppress_all;
        options.suppress_rule = self.suppress_rule.clone();
        options.prune_suppressions = self.prune_suppressions;
        options.pass_on_unpruned_suppressions = self.pass_on_unpruned_suppressions;
        options.suppressions_location = self.suppressions_location.clone();
        options
    }
}
