//! Build Pipeline Dispatcher and its collaborators.
//!
//! A build converts the manuscript to HTML and, for print output, renders the
//! HTML entry file to PDF afterwards. The converter and renderer are traits so
//! the dispatcher can be driven with recording fakes.

mod convert;
mod dispatcher;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use bookpub_config::{OutputType, ENTRY_FILE};

use crate::context::ProjectContext;

pub use convert::{Converter, MarkdownConverter};
pub use dispatcher::Dispatcher;
pub use render::{PrinceRenderer, RenderStatus, Renderer};

/// Inputs of one build. Built fresh for every build and rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub manuscript: PathBuf,
    pub output_dir: PathBuf,
    pub output_type: OutputType,
}

impl BuildRequest {
    pub fn new(ctx: &ProjectContext, output_type: OutputType) -> Self {
        Self {
            manuscript: ctx.manuscript_dir.clone(),
            output_dir: ctx.output_dir(output_type),
            output_type,
        }
    }

    /// HTML entry point written by the conversion step.
    pub fn entry_file(&self) -> PathBuf {
        self.output_dir.join(ENTRY_FILE)
    }
}

/// Result of a build whose conversion succeeded.
#[derive(Debug)]
pub struct BuildReport {
    pub request: BuildRequest,
    pub entry: PathBuf,
    pub duration: Duration,
    /// `None` when the output type has no render step
    pub render: Option<RenderStatus>,
}

impl BuildReport {
    pub fn render_failed(&self) -> bool {
        matches!(self.render, Some(RenderStatus::Failed(_)))
    }

    /// Final artifact: the PDF when rendered, the HTML entry otherwise.
    pub fn artifact(&self) -> &std::path::Path {
        match &self.render {
            Some(RenderStatus::Rendered(pdf)) => pdf,
            _ => &self.entry,
        }
    }
}
