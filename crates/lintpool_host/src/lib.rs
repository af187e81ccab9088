//! # lintpool_host
//!
//! The single-threaded JavaScript linter engine that lintpool fans out
//! across worker threads.
//!
//! This crate provides:
//! - Flat config arrays: config files, ignores and per-file resolution
//! - File discovery from command-line patterns
//! - Built-in rules, plugins and inline `eslint-disable` directives
//! - Autofix passes and the file-entry cache
//! - The [`HostEngine`] / [`HostFactory`] interface the parallel layer drives
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintpool_host::{EngineHooks, EngineOptions, HostFactory, LintpoolFactory};
//!
//! let factory = LintpoolFactory::default();
//! let engine = factory.create_engine(EngineOptions::new(cwd), EngineHooks::default())?;
//!
//! for result in engine.lint_files(&["src".to_string()])? {
//!     println!("{}: {} problems", result.file_path.display(), result.messages.len());
//! }
//! ```

mod api;
pub mod config;
pub mod directives;
mod engine;
mod error;
pub mod finder;
pub mod fixer;
pub mod helpers;
mod linter;
mod options;
pub mod plugins;
pub mod rules;
pub mod source;

pub use api::{EngineHooks, HostEngine, HostFactory, HostWarning, TEXT_PLACEHOLDER};
pub use config::{ConfigArray, ConfigLoader, ConfigObject, ConfigStatus, ResolvedConfig};
pub use engine::{
    DEFAULT_CACHE_FILE, LEGACY_IGNORE_FILE, LintpoolEngine, LintpoolFactory,
    resolve_cache_location, store_cached_results,
};
pub use error::HostError;
pub use fixer::{FixerResult, apply_fixes_to_content};
pub use linter::{Linter, MAX_FIX_PASSES, Verification};
pub use options::{EngineOptions, FindFilesOptions, FixMode, OverrideConfigFile, RuleFilter};
pub use plugins::{Plugin, PluginRegistry};
pub use rules::{Report, Rule, RuleContext, RuleFailure, RuleRegistry};
