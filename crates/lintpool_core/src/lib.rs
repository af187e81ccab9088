//! # lintpool_core
//!
//! Parallel linting and the suppressions file on top of `lintpool_host`.
//!
//! - [`translate_options`]: command-line options to engine options
//! - [`ParallelEngine`]: lints files on a pool of worker threads, each with
//!   its own host engine, and returns results in discovery order
//! - [`SuppressionsService`]: loads, applies and saves recorded error counts
//!
//! ## Example
//!
//! ```rust,ignore
//! use lintpool_core::{CliOptions, ParallelEngine, SuppressionMode, SuppressionsService};
//!
//! let factory = Arc::new(LintpoolFactory::default());
//! let engine = ParallelEngine::new(cli, factory, EngineHooks::default())?;
//! let mode = SuppressionMode::from_options(engine.parallel_options(), false)?;
//! let mut suppressions = SuppressionsService::load(engine.parallel_options(), mode, &cwd)?;
//!
//! let mut results = engine.lint_files(&patterns)?;
//! let unused = suppressions.apply(&mut results);
//! suppressions.save_if_needed()?;
//! ```

mod abort;
pub mod concurrency;
mod engine;
mod error;
mod options;
mod prewarm;
mod scheduler;
pub mod suppressions;
mod warnings;

pub use abort::AbortController;
pub use concurrency::{Concurrency, resolve_max_concurrency};
pub use engine::ParallelEngine;
pub use error::CoreError;
pub use options::{
    CliOptions, DEFAULT_SUPPRESSIONS_FILE, ParallelOptions, TranslatedOptions, parse_globals,
    parse_rules, translate_options,
};
pub use prewarm::prewarm_configs;
pub use scheduler::{FileOutcome, Scheduler};
pub use suppressions::{
    SuppressedViolations, SuppressionMode, SuppressionsService, UNUSED_SUPPRESSIONS_MESSAGE,
    UnusedSuppressions,
};
pub use warnings::{EmptyConfigWarnings, WarningChannel, worker_hooks};
