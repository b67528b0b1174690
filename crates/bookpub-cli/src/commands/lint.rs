//! Lint command implementation.
//!
//! Checks EJS templates for balanced `<% ... %>` delimiters. Templates are
//! not rendered; the check is lexical. `<%%` and `%%>` are literal escapes.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::cli::LintArgs;
use crate::context::ProjectContext;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use crate::walk;

/// Execute the lint command.
///
/// Stops at the first invalid file.
pub async fn execute(args: LintArgs, ctx: &ProjectContext) -> Result<()> {
    let files = match args.file {
        Some(file) if file.is_absolute() => vec![file],
        Some(file) => vec![ctx.root.join(file)],
        None => {
            if !fs::try_exists(&ctx.manuscript_dir).await.unwrap_or(false) {
                return Err(CliError::FileNotFound(ctx.manuscript_dir.clone()));
            }
            templates_under(&ctx.manuscript_dir)?
        }
    };

    if files.is_empty() {
        ui::info("No EJS templates found");
        return Ok(());
    }

    for file in &files {
        let source = fs::read_to_string(file).await.with_path(file)?;
        if let Err((line, message)) = check_delimiters(&source) {
            return Err(CliError::Lint {
                file: file.clone(),
                line,
                message,
            });
        }
        tracing::debug!(file = %file.display(), "template ok");
    }

    ui::success(&format!("{} template(s) passed", files.len()));
    Ok(())
}

/// Every `.ejs` file under `dir`, sorted. Hidden entries are skipped.
fn templates_under(dir: &Path) -> Result<Vec<PathBuf>> {
    let files = walk::files_under(dir)
        .map_err(std::io::Error::from)
        .context(format!("Failed to read {}", dir.display()))?;
    Ok(files
        .into_iter()
        .filter(|path| path.extension().is_some_and(|ext| ext == "ejs"))
        .collect())
}

/// First delimiter problem as `(line, message)`, lines counted from 1.
fn check_delimiters(source: &str) -> std::result::Result<(), (usize, String)> {
    let bytes = source.as_bytes();
    let mut line = 1;
    let mut open: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(b"<%%") || rest.starts_with(b"%%>") {
            i += 3;
            continue;
        }
        if rest.starts_with(b"<%") {
            if let Some(opened) = open {
                return Err((
                    line,
                    format!("'<%' inside a tag opened on line {opened} that was never closed"),
                ));
            }
            open = Some(line);
            i += 2;
            continue;
        }
        if rest.starts_with(b"%>") {
            if open.take().is_none() {
                return Err((line, "'%>' without a matching '<%'".to_string()));
            }
            i += 2;
            continue;
        }
        if bytes[i] == b'\n' {
            line += 1;
        }
        i += 1;
    }

    match open {
        Some(opened) => Err((opened, "unterminated tag".to_string())),
        None => Ok(()),
    }
}
