use std::sync::Arc;
use std::time::Instant;

use bookpub_config::{BookConfig, OutputType};

use super::{BuildReport, BuildRequest, Converter, MarkdownConverter, PrinceRenderer, Renderer};
use crate::context::ProjectContext;
use crate::error::{BuildError, Result};

/// Runs conversion and, for print output, the render step after it.
///
/// Shared by reference between overlapping rebuilds; holds no per-build state.
pub struct Dispatcher {
    converter: Arc<dyn Converter>,
    renderer: Arc<dyn Renderer>,
    book: Option<BookConfig>,
}

impl Dispatcher {
    pub fn new(converter: Arc<dyn Converter>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            converter,
            renderer,
            book: None,
        }
    }

    /// Markdown converter and the configured print renderer.
    pub fn for_project(ctx: &ProjectContext) -> Self {
        Self::new(
            Arc::new(MarkdownConverter::new()),
            Arc::new(PrinceRenderer::new(ctx.renderer.clone(), ctx.root.clone())),
        )
        .with_book(ctx.load_book())
    }

    pub fn with_book(mut self, book: Option<BookConfig>) -> Self {
        self.book = book;
        self
    }

    /// Parse a user-supplied output type, then build.
    ///
    /// An unknown type is rejected before any collaborator is called.
    pub async fn build_type(&self, ctx: &ProjectContext, raw: &str) -> Result<BuildReport> {
        let output_type: OutputType = raw.parse()?;
        Ok(self.build(BuildRequest::new(ctx, output_type)).await?)
    }

    /// Convert, then render when the output type needs it.
    ///
    /// `Err` means conversion failed and nothing was rendered. A render
    /// failure is reported in [`BuildReport::render`] instead.
    pub async fn build(&self, request: BuildRequest) -> std::result::Result<BuildReport, BuildError> {
        let started = Instant::now();
        tracing::debug!(
            output_type = %request.output_type,
            manuscript = %request.manuscript.display(),
            output = %request.output_dir.display(),
            "build started"
        );

        self.converter.convert(self.book.as_ref(), &request).await?;

        let entry = request.entry_file();
        if !tokio::fs::try_exists(&entry).await.unwrap_or(false) {
            return Err(BuildError::EntryMissing(entry));
        }

        let render = if request.output_type.needs_render() {
            Some(self.renderer.render(&entry, &request).await)
        } else {
            None
        };

        let report = BuildReport {
            request,
            entry,
            duration: started.elapsed(),
            render,
        };
        tracing::debug!(
            elapsed_ms = report.duration.as_millis() as u64,
            render_failed = report.render_failed(),
            "build finished"
        );
        Ok(report)
    }
}
