//! Terminal output for status lines, build banners and summaries.
//!
//! Everything here writes to stderr so stdout stays free for child processes
//! that inherit the terminal (the renderer and the dev server).
//!
//! # Examples
//!
//! ```no_run
//! use bookpub_cli::ui;
//!
//! ui::init_colors();
//! ui::info("Building html...");
//! ui::success("Build complete");
//! ```

mod format;
mod messages;

pub use format::{format_duration, format_size, print_build_summary};
pub use messages::{banner, error, info, location, success, warning};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, then falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Initialize color support based on environment.
///
/// Turns terminal styling off when the environment asks for plain output.
pub fn init_colors() {
    if !should_use_color() {
        console::set_colors_enabled_stderr(false);
    }
}
