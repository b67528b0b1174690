//! bookpub - publish a Markdown manuscript as a web book or a PDF.
//!
//! Entry point: argument parsing, logging initialization, and command dispatch.

use bookpub_cli::{cli, commands, context::ProjectContext, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color || !ui::should_use_color());
    ui::init_colors();

    let result = match ProjectContext::discover(args.cwd.as_deref()) {
        Ok(ctx) => match args.command {
            cli::Command::Build(build_args) => commands::build_execute(build_args, &ctx).await,
            cli::Command::Dev(dev_args) => commands::dev_execute(dev_args, &ctx).await,
            cli::Command::New(new_args) => commands::new_execute(new_args, &ctx).await,
            cli::Command::Lint(lint_args) => commands::lint_execute(lint_args, &ctx).await,
        },
        Err(e) => Err(e),
    };

    // Convert CLI errors to miette diagnostics for multi-line error reports
    result.map_err(error::cli_error_to_miette)
}
