//! Host linter error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring or running the host linter.
#[derive(Debug, Error)]
pub enum HostError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid engine options.
    #[error("Invalid Options: {0}")]
    InvalidOptions(String),

    /// File I/O error.
    #[error("File error: {0}")]
    File(String),

    /// Plugin could not be resolved.
    #[error("Plugin error: {0}")]
    Plugin(String),

    /// A rule failed while linting a file.
    #[error("Error while linting {path}: rule '{rule_id}' failed: {message}")]
    Rule {
        rule_id: String,
        path: PathBuf,
        message: String,
    },

    /// A pattern matched nothing.
    #[error("No files matching the pattern \"{0}\" were found.")]
    NoFilesFound(String),

    /// A pattern matched only ignored files.
    #[error("All files matched by '{0}' are ignored.")]
    AllFilesIgnored(String),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] lintpool_cache::CacheError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HostError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an invalid options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions(message.into())
    }

    /// Creates a file error.
    pub fn file(message: impl Into<String>) -> Self {
        Self::File(message.into())
    }

    /// Creates a plugin error.
    pub fn plugin(message: impl Into<String>) -> Self {
        Self::Plugin(message.into())
    }

    /// Creates a rule failure.
    pub fn rule(
        rule_id: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::Rule {
            rule_id: rule_id.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
