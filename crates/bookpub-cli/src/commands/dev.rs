//! Dev command implementation.
//!
//! Resolves the watcher configuration, then hands over to the
//! [`DevSession`](crate::dev::DevSession) state machine.

use bookpub_config::{ConfigSource, OutputType, WatchConfigResolver};
use futures::future::{BoxFuture, FutureExt};

use crate::cli::DevArgs;
use crate::context::ProjectContext;
use crate::dev::{DevSession, ProjectProcesses};
use crate::error::Result;
use crate::pipeline::{BuildRequest, Dispatcher};
use crate::ui;

/// Execute the dev command.
///
/// Returns on Ctrl+C or once the watcher or the dev server ends.
pub async fn execute(args: DevArgs, ctx: &ProjectContext) -> Result<()> {
    let output_type: OutputType = args.output_type.parse()?;
    let ctx = ctx
        .clone()
        .with_renderer(args.renderer)
        .with_bundler(args.bundler);

    let mut resolver = WatchConfigResolver::new(&ctx.root, ctx.tool.as_str());
    if let Some(exe) = &ctx.executable {
        resolver = resolver.with_script(exe);
    }
    let resolved = resolver.resolve(output_type);
    match &resolved.source {
        ConfigSource::User(path) => {
            ui::info(&format!("Using watch settings from {}", ctx.relative(path).display()))
        }
        ConfigSource::Default(_) => {
            if let Some(message) = resolved.fallback_message(output_type) {
                ui::info(&message);
            }
        }
    }

    let request = BuildRequest::new(&ctx, output_type);
    ui::banner(&format!("Starting {} dev session", output_type));
    ui::location("Manuscript Location", &ctx.root, &request.manuscript);
    ui::location("Build Output Location", &ctx.root, &request.output_dir);

    let dispatcher = Dispatcher::for_project(&ctx);
    let session = DevSession::new(
        &dispatcher,
        ProjectProcesses::new(&ctx),
        request,
        resolved.config,
    )
    .with_interrupt(ctrl_c());
    let summary = session.run().await?;

    ui::success(&format!(
        "Dev session ended after {} rebuild(s), {} failed",
        summary.rebuilds, summary.failed_rebuilds
    ));
    Ok(())
}

/// Resolves on the first Ctrl+C. Never resolves if the handler cannot be
/// installed.
fn ctrl_c() -> BoxFuture<'static, ()> {
    async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
    .boxed()
}
