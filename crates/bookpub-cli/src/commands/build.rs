//! Build command implementation.
//!
//! `bookpub build --type <html|pdf>` converts the manuscript and, for pdf,
//! renders the generated HTML entry with the print renderer.

use std::path::Path;
use std::time::Instant;

use bookpub_config::OutputType;

use crate::cli::BuildArgs;
use crate::context::ProjectContext;
use crate::error::{CliError, Result};
use crate::pipeline::{BuildReport, BuildRequest, Dispatcher, RenderStatus};
use crate::ui;

/// Execute the build command.
///
/// # Errors
///
/// - Unknown output type, before anything is read or written
/// - Missing, empty or unconvertible manuscript
/// - Print renderer failing to start or exiting non-zero; the HTML written
///   by the conversion step is left in place
pub async fn execute(args: BuildArgs, ctx: &ProjectContext) -> Result<()> {
    let started = Instant::now();
    let output_type: OutputType = args.output_type.parse()?;
    let ctx = ctx.clone().with_renderer(args.renderer);

    let request = BuildRequest::new(&ctx, output_type);
    ui::banner(&format!("Building your {} book", output_type));
    ui::location("Manuscript Location", &ctx.root, &request.manuscript);
    ui::location("Build Output Location", &ctx.root, &request.output_dir);
    if output_type.needs_render() {
        ui::info(&format!(
            "Generating PDF from {} with {}",
            ctx.relative(&request.entry_file()).display(),
            ctx.renderer
        ));
    }

    let dispatcher = Dispatcher::for_project(&ctx);
    let report = dispatcher.build(request).await?;

    if let Some(RenderStatus::Failed(e)) = report.render {
        ui::warning(&format!(
            "HTML output kept at {}",
            ctx.relative(&report.entry).display()
        ));
        return Err(CliError::Build(e));
    }

    print_summary(&ctx, &report, started).await;
    ui::banner("All Finished!");
    Ok(())
}

async fn print_summary(ctx: &ProjectContext, report: &BuildReport, started: Instant) {
    let mut entries = Vec::new();
    for path in artifacts(report) {
        if let Ok(meta) = tokio::fs::metadata(path).await {
            entries.push((ctx.relative(path).display().to_string(), meta.len()));
        }
    }
    ui::print_build_summary(&entries, started.elapsed());
}

fn artifacts(report: &BuildReport) -> Vec<&Path> {
    let mut paths = vec![report.entry.as_path()];
    if report.artifact() != report.entry.as_path() {
        paths.push(report.artifact());
    }
    paths
}
