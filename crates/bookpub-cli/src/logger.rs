//! Logging infrastructure for the bookpub CLI.
//!
//! Structured logging with `tracing`. Child process lifecycle, watcher
//! batches and config fallbacks are logged here; user-facing status lines
//! go through [`crate::ui`].
//!
//! # Example
//!
//! ```rust,no_run
//! use bookpub_cli::logger::init_logger;
//! use tracing::{info, debug, error};
//!
//! init_logger(false, false, false);
//!
//! info!("Starting build");
//! debug!("Converting chapter: {}", "01-introduction.md");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "bookpub=debug,bookpub_cli=debug,bookpub_config=debug";
const QUIET_FILTER: &str = "bookpub=error,bookpub_cli=error,bookpub_config=error";
const DEFAULT_FILTER: &str = "bookpub=info,bookpub_cli=info,bookpub_config=info";

/// Install the global tracing subscriber.
///
/// Precedence: `--verbose` (debug) > `--quiet` (errors only) > `RUST_LOG` >
/// info. Log lines go to stderr next to the `ui` status lines.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    // Determine the filter level based on flags and environment
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        // Try to read from RUST_LOG env var, fallback to info level
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    // Configure the formatter
    let fmt_layer = fmt::layer()
        .with_target(false) // Don't show the module path (keeps output clean)
        .with_level(true) // Show log level (INFO, DEBUG, etc.)
        .with_ansi(!no_color) // Enable colors unless disabled
        .with_writer(std::io::stderr)
        .compact();

    // try_init: a second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filters_parse() {
        let _ = EnvFilter::new(VERBOSE_FILTER);
        let _ = EnvFilter::new(QUIET_FILTER);
        let _ = EnvFilter::new(DEFAULT_FILTER);
    }

    #[test]
    fn test_init_logger_twice_does_not_panic() {
        init_logger(false, true, true);
        init_logger(true, false, true);
    }
}
