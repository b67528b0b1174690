//! Miette diagnostic conversion for CLI errors.

use crate::error::{BuildError, CliError};
use ::miette::Report;

/// Convert CliError to a miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => ::miette::miette!("Configuration error: {}", e),
        CliError::Lint {
            file,
            line,
            message,
        } => ::miette::miette!(
            "Lint failed: {}\n  --> {}:{}\n\nHint: Every '<%' needs a matching '%>'",
            message,
            file.display(),
            line
        ),
        _ => ::miette::miette!("{}", err),
    }
}

/// Convert BuildError to a multi-line miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::Conversion { file, message } => {
            ::miette::miette!(
                "Conversion failed\n  --> {}\n\n{}\n\nHint: Fix the chapter and run the build again",
                file.display(),
                message
            )
        }
        BuildError::RenderFailed { program, outcome } => {
            ::miette::miette!(
                "PDF render failed: '{}' {}\n\nHint: The HTML output in build/pdf is still available",
                program,
                outcome
            )
        }
        _ => ::miette::miette!("{}", err),
    }
}
