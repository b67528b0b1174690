//! Status message functions for terminal output.

use owo_colors::OwoColorize;
use std::path::Path;

/// Print a success message to stderr.
///
/// ```no_run
/// use bookpub_cli::ui::success;
///
/// success("Build completed successfully");
/// ```
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Large one-line heading, e.g. the build start and finish banners.
pub fn banner(message: &str) {
    eprintln!("\n  {}\n", message.bright_magenta().bold());
}

/// Labelled project-relative location (`Manuscript Location: /manuscript/`).
pub fn location(label: &str, root: &Path, path: &Path) {
    let rel = path.strip_prefix(root).unwrap_or(path);
    eprintln!(
        "    {}: {}",
        label,
        format!("/{}/", rel.display()).bright_yellow()
    );
}
