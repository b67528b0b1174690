//! Per-invocation project settings, built once in `main` and passed down.

use std::path::{Path, PathBuf};

use bookpub_config::{BookConfig, OutputType, BUILD_DIR};

use crate::error::Result;
use crate::ui;

/// Name the tool is invoked as; also used in default rebuild commands.
pub const TOOL_NAME: &str = "bookpub";

/// Manuscript directory under the project root.
pub const MANUSCRIPT_DIR: &str = "manuscript";

/// Optional bundler configuration passed through to the dev server.
pub const WEBPACK_CONFIG: &str = "webpack.config.js";

pub const DEFAULT_RENDERER: &str = "prince";
pub const DEFAULT_BUNDLER: &str = "npx webpack serve";

/// Everything a command needs to know about the project and the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub manuscript_dir: PathBuf,
    pub build_dir: PathBuf,
    pub tool: String,
    pub version: String,
    /// Path of the running binary, when known
    pub executable: Option<PathBuf>,
    /// Print renderer program
    pub renderer: String,
    /// Dev server command line
    pub bundler: String,
}

impl ProjectContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            manuscript_dir: root.join(MANUSCRIPT_DIR),
            build_dir: root.join(BUILD_DIR),
            root,
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            executable: None,
            renderer: DEFAULT_RENDERER.to_string(),
            bundler: DEFAULT_BUNDLER.to_string(),
        }
    }

    /// Context for `--cwd`, or the current directory when not given.
    pub fn discover(cwd: Option<&Path>) -> Result<Self> {
        let root = match cwd {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => std::env::current_dir()?.join(dir),
            None => std::env::current_dir()?,
        };

        let mut ctx = Self::new(root);
        ctx.executable = std::env::current_exe().ok();
        Ok(ctx)
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = renderer.into();
        self
    }

    pub fn with_bundler(mut self, bundler: impl Into<String>) -> Self {
        self.bundler = bundler.into();
        self
    }

    pub fn output_dir(&self, output_type: OutputType) -> PathBuf {
        output_type.output_dir(&self.root)
    }

    /// `webpack.config.js` in the project root, if present.
    pub fn webpack_config(&self) -> Option<PathBuf> {
        let path = self.root.join(WEBPACK_CONFIG);
        path.is_file().then_some(path)
    }

    /// Load `book.config.yml`. A broken file is reported and treated as absent.
    pub fn load_book(&self) -> Option<BookConfig> {
        match BookConfig::load(&self.root) {
            Ok(book) => book,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring project config");
                ui::warning(&format!("{e}; continuing without book metadata"));
                None
            }
        }
    }

    /// Path relative to the project root, for display.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
