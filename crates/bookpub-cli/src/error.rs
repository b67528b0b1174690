//! Error handling for the bookpub CLI.
//!
//! The hierarchy mirrors the orchestration layers:
//! - **Top-level errors** (`CliError`) are what commands return
//! - **Domain errors** (`ConfigError` from `bookpub-config`, `BuildError`) carry
//!   the detail and an actionable hint
//! - **Context helpers** (`ResultExt`) attach paths and hints at call sites
//!
//! # Example
//!
//! ```rust,no_run
//! use bookpub_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_chapter(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .with_hint("Chapters live under manuscript/")
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

pub use bookpub_config::ConfigError;

mod miette;
pub use self::miette::{build_error_to_miette, cli_error_to_miette};

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Output type, project or watcher configuration problems
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Conversion or render failures
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dev server or watcher ended the session with a failure
    #[error("Dev session error: {0}")]
    Session(String),

    /// Template lint failure
    #[error("Lint error in {}:{line}: {message}\n\nHint: Every '<%' needs a matching '%>'", .file.display())]
    Lint {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error message with context or a hint prepended by [`ResultExt`]
    #[error("{0}")]
    Custom(String),
}

/// Build pipeline errors.
///
/// Conversion errors abort a request before any render step. Render errors
/// leave the HTML output in place.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Manuscript directory doesn't exist
    #[error("Manuscript not found: {}\n\nHint: Run bookpub from the project root or pass --cwd <dir>", .0.display())]
    ManuscriptNotFound(PathBuf),

    /// Manuscript has no markup files
    #[error("No chapters found in {}\n\nHint: Add at least one .md file to the manuscript directory", .0.display())]
    EmptyManuscript(PathBuf),

    /// A chapter failed to convert
    #[error("Failed to convert {}: {message}", .file.display())]
    Conversion { file: PathBuf, message: String },

    /// Conversion finished without producing the entry file
    #[error("Conversion did not produce {}\n\nHint: Check the converter output above", .0.display())]
    EntryMissing(PathBuf),

    /// Failed to write output file or asset
    #[error("Failed to write {}: {message}\n\nHint: Check output directory permissions", .path.display())]
    WriteFailed { path: PathBuf, message: String },

    /// Renderer binary could not be started
    #[error("Failed to start renderer '{program}': {message}\n\nHint: Install it or pass --renderer <program>")]
    RenderSpawn { program: String, message: String },

    /// Renderer ran but did not succeed
    #[error("Renderer '{program}' {outcome}")]
    RenderFailed { program: String, outcome: String },
}

impl BuildError {
    /// Whether the failure happened before the render step.
    pub fn is_conversion(&self) -> bool {
        !matches!(
            self,
            BuildError::RenderSpawn { .. } | BuildError::RenderFailed { .. }
        )
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Add a file path to the error context.
    ///
    /// I/O not-found errors become [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Add a helpful hint to the error context.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error with a message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
