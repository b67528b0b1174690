//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Output type selection
    #[error("Invalid output type specified. Use either \"html\" or \"pdf\". (got '{0}')")]
    UnknownOutputType(String),

    // Config parsing/loading errors
    #[error("failed to parse {}: {message}", .path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("invalid config value for '{field}'{}", .hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    // Watcher contract violations
    #[error("watch config {} is missing an execMap entry for 'html'", .0.display())]
    MissingHtmlExec(PathBuf),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn malformed(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
