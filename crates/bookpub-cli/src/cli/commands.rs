use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::parse_project_name;
use crate::context::{DEFAULT_BUNDLER, DEFAULT_RENDERER};

/// Available bookpub subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the book
    ///
    /// Converts manuscript/ into build/<type>/index.html. For pdf output the
    /// HTML entry is then handed to the print renderer, producing
    /// build/pdf/index.pdf.
    Build(BuildArgs),

    /// Start a development session
    ///
    /// Runs an initial build, starts the bundler's dev server, and rebuilds
    /// whenever a watched manuscript file changes.
    Dev(DevArgs),

    /// Create a new book project
    New(NewArgs),

    /// Lint EJS templates
    ///
    /// Checks one template, or every .ejs file under manuscript/, for
    /// unbalanced `<% %>` delimiters.
    Lint(LintArgs),
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Output type: html or pdf
    ///
    /// Kept as free text so an unknown type is reported with the build's own
    /// diagnostic rather than clap's.
    #[arg(short = 't', long = "type", default_value = "html", value_name = "TYPE")]
    pub output_type: String,

    /// Print renderer program used for pdf output
    #[arg(long, env = "BOOKPUB_RENDERER", default_value = DEFAULT_RENDERER)]
    pub renderer: String,
}

/// Arguments for the dev command
#[derive(Args, Debug)]
pub struct DevArgs {
    /// Output type: html or pdf
    #[arg(short = 't', long = "type", default_value = "html", value_name = "TYPE")]
    pub output_type: String,

    /// Print renderer program used for pdf rebuilds
    #[arg(long, env = "BOOKPUB_RENDERER", default_value = DEFAULT_RENDERER)]
    pub renderer: String,

    /// Dev server command line; `--env outputType=<type>` is appended
    #[arg(long, env = "BOOKPUB_BUNDLER", default_value = DEFAULT_BUNDLER)]
    pub bundler: String,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Directory name of the new project
    ///
    /// Letters, digits, `-` and `_` only; must not start with `.` or a digit.
    #[arg(value_name = "PROJECT_NAME", value_parser = parse_project_name)]
    pub name: String,
}

/// Arguments for the lint command
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Template to lint (defaults to every .ejs file under manuscript/)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}
