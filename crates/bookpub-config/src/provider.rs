//! Watcher configuration providers.
//!
//! A provider answers one question: "do you have a watcher configuration?"
//! The resolver asks the user file first and the defaults last.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::output::OutputType;
use crate::watch::{WatchFile, WatcherConfig, WATCH_CONFIG_FILE};

/// Source of a [`WatcherConfig`].
pub trait WatchConfigProvider {
    /// Short label used in log output
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the provider has nothing to offer.
    fn provide(&self) -> Result<Option<WatcherConfig>>;
}

/// Reads and validates `bookpub.watch.json`.
///
/// Declarative JSON only: user configuration is never executed.
pub struct FileProvider {
    path: PathBuf,
    defaults: WatcherConfig,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>, defaults: WatcherConfig) -> Self {
        Self {
            path: path.into(),
            defaults,
        }
    }

    /// Provider for the conventional file under `root`.
    pub fn in_root(root: &Path, defaults: WatcherConfig) -> Self {
        Self::new(root.join(WATCH_CONFIG_FILE), defaults)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WatchConfigProvider for FileProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    fn provide(&self) -> Result<Option<WatcherConfig>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no watch config file");
            return Ok(None);
        }

        let file = WatchFile::read(&self.path)?;
        file.validate(&self.path)?;

        tracing::debug!(path = %self.path.display(), "loaded watch config file");
        Ok(Some(file.into_config(&self.path, self.defaults.clone())))
    }
}

/// Always provides the default shape for an output type.
pub struct DefaultProvider {
    output_type: OutputType,
    tool: String,
    script: Option<PathBuf>,
}

impl DefaultProvider {
    pub fn new(output_type: OutputType, tool: impl Into<String>, script: Option<PathBuf>) -> Self {
        Self {
            output_type,
            tool: tool.into(),
            script,
        }
    }

    pub fn config(&self) -> WatcherConfig {
        WatcherConfig::default_for(self.output_type, &self.tool, self.script.clone())
    }
}

impl WatchConfigProvider for DefaultProvider {
    fn name(&self) -> &'static str {
        "default"
    }

    fn provide(&self) -> Result<Option<WatcherConfig>> {
        Ok(Some(self.config()))
    }
}
