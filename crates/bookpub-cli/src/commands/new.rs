//! New command implementation.
//!
//! `bookpub new <name>` scaffolds a project directory with a book config, a
//! one-chapter manuscript, a stylesheet and a sample watcher config.

use std::path::Path;

use bookpub_config::{BOOK_CONFIG_FILE, WATCH_CONFIG_FILE};

use super::templates;
use crate::cli::NewArgs;
use crate::context::{ProjectContext, MANUSCRIPT_DIR};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Execute the new command.
///
/// The project is created under the context root. The name itself was
/// validated while parsing arguments.
pub async fn execute(args: NewArgs, ctx: &ProjectContext) -> Result<()> {
    let project_dir = ctx.root.join(&args.name);
    if project_dir.exists() {
        return Err(CliError::InvalidArgument(format!(
            "Directory '{}' already exists",
            args.name
        )));
    }

    ui::info(&format!("Creating new book project: {}", args.name));
    generate_project_files(&project_dir, &args.name)?;
    ui::success(&format!("Project '{}' created", args.name));
    print_next_steps(&args.name);
    Ok(())
}

fn generate_project_files(project_dir: &Path, name: &str) -> Result<()> {
    let manuscript = project_dir.join(MANUSCRIPT_DIR);
    std::fs::create_dir_all(&manuscript)
        .with_path(project_dir)
        .with_hint("Check that the parent directory exists and is writable")?;

    write(project_dir, BOOK_CONFIG_FILE, &templates::book_config(name))?;
    write(
        project_dir,
        &format!("{MANUSCRIPT_DIR}/01-introduction.md"),
        &templates::introduction(name),
    )?;
    write(
        project_dir,
        &format!("{MANUSCRIPT_DIR}/style.css"),
        templates::stylesheet(),
    )?;
    write(project_dir, WATCH_CONFIG_FILE, &templates::watch_config()?)?;
    write(project_dir, ".gitignore", templates::gitignore())?;
    Ok(())
}

fn write(project_dir: &Path, rel: &str, content: &str) -> Result<()> {
    std::fs::write(project_dir.join(rel), content)?;
    ui::success(&format!("  Created {}", rel));
    Ok(())
}

fn print_next_steps(name: &str) {
    eprintln!();
    ui::info("Next steps:");
    eprintln!();
    eprintln!("  cd {}", name);
    eprintln!("  bookpub dev");
    eprintln!();
}
