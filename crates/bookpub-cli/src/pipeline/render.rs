use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bookpub_config::PDF_FILE;

use super::BuildRequest;
use crate::error::BuildError;
use crate::process::{ExitOutcome, ProcessSpec, Supervisor};

/// Outcome of the print render step.
#[derive(Debug)]
pub enum RenderStatus {
    /// PDF written to this path
    Rendered(PathBuf),
    /// The HTML output stays in place
    Failed(BuildError),
}

/// HTML to PDF rendering.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `entry`, the HTML entry file of `request`.
    async fn render(&self, entry: &Path, request: &BuildRequest) -> RenderStatus;
}

/// Runs an external print renderer (Prince by default) as
/// `<program> build/pdf/index.html` from the project root.
#[derive(Debug, Clone)]
pub struct PrinceRenderer {
    program: String,
    root: PathBuf,
    supervisor: Supervisor,
}

impl PrinceRenderer {
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
            supervisor: Supervisor::new(),
        }
    }

    pub fn spec(&self, entry: &Path) -> ProcessSpec {
        let arg = entry.strip_prefix(&self.root).unwrap_or(entry);
        ProcessSpec::new(&self.program)
            .named("renderer")
            .arg(arg.to_string_lossy())
            .cwd(&self.root)
    }
}

#[async_trait]
impl Renderer for PrinceRenderer {
    async fn render(&self, entry: &Path, request: &BuildRequest) -> RenderStatus {
        let spec = self.spec(entry);
        tracing::info!(command = %spec, "rendering pdf");

        match self.supervisor.run(&spec).await {
            ExitOutcome::Exited(0) => RenderStatus::Rendered(request.output_dir.join(PDF_FILE)),
            ExitOutcome::SpawnFailed(message) => RenderStatus::Failed(BuildError::RenderSpawn {
                program: self.program.clone(),
                message,
            }),
            outcome => RenderStatus::Failed(BuildError::RenderFailed {
                program: self.program.clone(),
                outcome: outcome.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookpub_config::OutputType;

    fn request(root: &Path) -> BuildRequest {
        BuildRequest {
            manuscript: root.join("manuscript"),
            output_dir: OutputType::Pdf.output_dir(root),
            output_type: OutputType::Pdf,
        }
    }

    #[test]
    fn spec_passes_project_relative_entry() {
        let renderer = PrinceRenderer::new("prince", "/book");
        let spec = renderer.spec(Path::new("/book/build/pdf/index.html"));
        assert_eq!(spec.command_line(), "prince build/pdf/index.html");
        assert_eq!(spec.working_dir(), Some(Path::new("/book")));
    }

    #[tokio::test]
    async fn missing_renderer_is_a_spawn_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let renderer = PrinceRenderer::new("bookpub-no-such-renderer", dir.path());
        let req = request(dir.path());

        match renderer.render(&req.entry_file(), &req).await {
            RenderStatus::Failed(BuildError::RenderSpawn { program, .. }) => {
                assert_eq!(program, "bookpub-no-such-renderer");
            }
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_a_render_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let renderer = PrinceRenderer::new("false", dir.path());
        let req = request(dir.path());

        assert!(matches!(
            renderer.render(&req.entry_file(), &req).await,
            RenderStatus::Failed(BuildError::RenderFailed { .. })
        ));
    }
}
