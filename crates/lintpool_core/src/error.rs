//! Parallel layer error types.

use std::path::PathBuf;

use lintpool_host::HostError;
use thiserror::Error;

/// Errors that can occur while translating options, scheduling workers or
/// maintaining the suppressions file.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Error raised by the host engine.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Invalid command-line options.
    #[error("{0}")]
    InvalidOption(String),

    /// Invalid `--concurrency` value.
    #[error("Option concurrency: '{0}' is not a valid value. Use a positive integer, 'auto' or 'off'.")]
    InvalidConcurrency(String),

    /// The suppressions file is required but missing.
    #[error("The suppressions file does not exist. Please run the command with `--suppress-all` or `--suppress-rule` to create it.")]
    SuppressionsMissing(PathBuf),

    /// The suppressions file is not valid JSON.
    #[error("Failed to parse suppressions file at {}: {source}", path.display())]
    SuppressionsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A worker thread panicked.
    #[error("A lint worker panicked: {0}")]
    WorkerPanic(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Creates an invalid option error.
    pub fn invalid_option(message: impl Into<String>) -> Self {
        Self::InvalidOption(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
