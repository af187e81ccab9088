//! Lint command implementation

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use lintpool_core::{
    ParallelEngine, SuppressionMode, SuppressionsService, UNUSED_SUPPRESSIONS_MESSAGE,
};
use lintpool_diagnostic::{LintResult, LintSummary, RulesMeta};
use lintpool_host::{EngineHooks, LintpoolFactory};
use miette::{IntoDiagnostic, Result, miette};
use tracing::{debug, info};

use crate::cli::{Cli, OutputFormat};
use crate::output::format_results;

/// How a lint run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintOutcome {
    /// No unsuppressed errors and not too many warnings.
    Clean,
    /// Unsuppressed errors, or more warnings than allowed.
    Problems,
    /// Suppressions left that matched nothing.
    UnusedSuppressions,
}

pub fn run_lint(cli: &Cli, cwd: &Path) -> Result<LintOutcome> {
    if cli.stdin && cli.fix {
        return Err(miette!(
            "The --fix option is not supported for piped-in code; use --fix-dry-run instead."
        ));
    }
    if !cli.fix_type.is_empty() && !cli.fix && !cli.fix_dry_run {
        return Err(miette!(
            "The --fix-type option requires either --fix or --fix-dry-run."
        ));
    }

    let engine = ParallelEngine::new(
        cli.to_options(cwd),
        Arc::new(LintpoolFactory::default()),
        EngineHooks::default(),
    )
    .into_diagnostic()?;
    let mode =
        SuppressionMode::from_options(engine.parallel_options(), cli.stdin).into_diagnostic()?;
    let mut suppressions =
        SuppressionsService::load(engine.parallel_options(), mode, cwd).into_diagnostic()?;

    let mut results = if cli.stdin {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).into_diagnostic()?;
        engine
            .lint_text(&text, cli.stdin_filename.as_deref())
            .into_diagnostic()?
    } else {
        engine.lint_files(&cli.patterns).into_diagnostic()?
    };

    let unused = suppressions.apply(&mut results);
    if cli.fix {
        engine.output_fixes(&results).into_diagnostic()?;
    }
    if suppressions.save_if_needed().into_diagnostic()? {
        debug!("Updated {}", suppressions.location().display());
    }

    let summary = LintSummary::from_results(&results);
    info!(
        "{} files, {} errors, {} warnings, {} suppressed",
        summary.file_count, summary.error_count, summary.warning_count, summary.suppressed_count
    );

    let to_print = if cli.quiet {
        error_results(results)
    } else {
        results
    };
    let rules_meta = if cli.format == OutputFormat::JsonWithMetadata {
        engine.rules_meta_for_results(&to_print).into_diagnostic()?
    } else {
        RulesMeta::new()
    };
    let output = format_results(&to_print, cli.format, &rules_meta)?;
    print_output(&output, cli.output_file.as_deref(), cwd)?;

    let too_many_warnings =
        cli.max_warnings >= 0 && summary.warning_count as i64 > cli.max_warnings;
    if too_many_warnings {
        eprintln!(
            "lintpool found too many warnings (maximum: {}).",
            cli.max_warnings
        );
    }

    if !unused.is_empty()
        && *suppressions.mode() == SuppressionMode::Report
        && !engine.parallel_options().pass_on_unpruned_suppressions
    {
        for (file, rules) in &unused {
            for (rule_id, count) in rules {
                debug!("Unused suppression: {} {} ({})", file, rule_id, count);
            }
        }
        eprintln!("{UNUSED_SUPPRESSIONS_MESSAGE}");
        return Ok(LintOutcome::UnusedSuppressions);
    }

    if summary.error_count > 0 || too_many_warnings {
        Ok(LintOutcome::Problems)
    } else {
        Ok(LintOutcome::Clean)
    }
}

/// Keeps only error messages, dropping results left without any.
fn error_results(results: Vec<LintResult>) -> Vec<LintResult> {
    results
        .into_iter()
        .filter_map(|mut result| {
            result.messages.retain(|m| m.is_error());
            result.recount();
            (result.error_count > 0).then_some(result)
        })
        .collect()
}

fn print_output(output: &str, output_file: Option<&Path>, cwd: &Path) -> Result<()> {
    match output_file {
        Some(path) => {
            let path = cwd.join(path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).into_diagnostic()?;
            }
            fs::write(&path, output).into_diagnostic()?;
        }
        None if !output.is_empty() => println!("{output}"),
        None => {}
    }
    Ok(())
}
