//! Output types and the conventional build tree layout.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

/// Directory under the project root that every build writes into.
pub const BUILD_DIR: &str = "build";

/// Entry file produced by the HTML conversion.
pub const ENTRY_FILE: &str = "index.html";

/// Print artifact produced next to the entry file.
pub const PDF_FILE: &str = "index.pdf";

/// Kind of artifact a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Html,
    Pdf,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Html => "html",
            OutputType::Pdf => "pdf",
        }
    }

    /// `<root>/build/<type>`
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(BUILD_DIR).join(self.as_str())
    }

    /// `<root>/build/<type>/index.html`
    pub fn entry_file(&self, root: &Path) -> PathBuf {
        self.output_dir(root).join(ENTRY_FILE)
    }

    /// `<root>/build/pdf/index.pdf` for print builds, the entry file otherwise.
    pub fn artifact(&self, root: &Path) -> PathBuf {
        match self {
            OutputType::Html => self.entry_file(root),
            OutputType::Pdf => self.output_dir(root).join(PDF_FILE),
        }
    }

    /// Whether a print render step follows the HTML conversion.
    pub fn needs_render(&self) -> bool {
        matches!(self, OutputType::Pdf)
    }

    /// Command line that rebuilds this output type with the given tool.
    pub fn rebuild_command(&self, tool: &str) -> String {
        format!("{} build --type {}", tool, self.as_str())
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(OutputType::Html),
            "pdf" => Ok(OutputType::Pdf),
            _ => Err(ConfigError::UnknownOutputType(s.to_string())),
        }
    }
}
