//! Command-line interface definition for bookpub.
//!
//! # Command Structure
//!
//! - `bookpub build` - Convert the manuscript, and render it for print
//! - `bookpub dev` - Build, serve and rebuild on manuscript changes
//! - `bookpub new` - Scaffold a new book project
//! - `bookpub lint` - Check EJS templates for unbalanced delimiters

mod commands;
mod validation;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{BuildArgs, Command, DevArgs, LintArgs, NewArgs};
pub use validation::parse_project_name;

/// bookpub - publish a Markdown manuscript as a web book or a PDF
#[derive(Parser, Debug)]
#[command(
    name = "bookpub",
    version,
    about = "Publish a Markdown manuscript as a web book or a PDF",
    long_about = "bookpub converts a manuscript/ directory into a browsable HTML book,\n\
                  renders it to PDF with an external print renderer, and runs a\n\
                  watch-and-rebuild dev session next to the bundler's dev server."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, env = "BOOKPUB_CWD", value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
