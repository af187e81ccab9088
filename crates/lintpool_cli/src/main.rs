//! lintpool CLI
//!
//! Lints JavaScript files on a pool of worker threads and reconciles the
//! results with a suppressions file.

mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::lint::{LintOutcome, run_lint};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(LintOutcome::Clean) => ExitCode::SUCCESS,
        Ok(LintOutcome::Problems) => ExitCode::from(1),
        Ok(LintOutcome::UnusedSuppressions) => ExitCode::from(2),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<LintOutcome> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    run_lint(cli, &cwd)
}
