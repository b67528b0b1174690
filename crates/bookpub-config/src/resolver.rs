//! Config Resolver: user watcher file when valid, defaults otherwise.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::output::OutputType;
use crate::provider::{DefaultProvider, FileProvider, WatchConfigProvider};
use crate::watch::WatcherConfig;

/// Where a resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    User(PathBuf),
    Default(FallbackReason),
}

/// Why the user file was not used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Missing,
    Unreadable(String),
    Invalid(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Missing => f.write_str("no watch config file"),
            FallbackReason::Unreadable(msg) => write!(f, "watch config unreadable: {msg}"),
            FallbackReason::Invalid(msg) => write!(f, "watch config ignored: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWatchConfig {
    pub config: WatcherConfig,
    pub source: ConfigSource,
}

impl ResolvedWatchConfig {
    pub fn is_default(&self) -> bool {
        matches!(self.source, ConfigSource::Default(_))
    }

    /// Status line announcing the fallback, if one happened.
    pub fn fallback_message(&self, output_type: OutputType) -> Option<String> {
        self.is_default()
            .then(|| format!("Using default watch settings with outputType: {output_type}."))
    }
}

/// Resolves the watcher configuration for a project root.
///
/// Resolution never fails: any problem with the user file is logged and the
/// default shape is used instead.
#[derive(Debug, Clone)]
pub struct WatchConfigResolver {
    root: PathBuf,
    tool: String,
    script: Option<PathBuf>,
}

impl WatchConfigResolver {
    pub fn new(root: impl AsRef<Path>, tool: impl Into<String>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            tool: tool.into(),
            script: None,
        }
    }

    /// Script recorded in the default shape (usually the running binary).
    pub fn with_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn resolve(&self, output_type: OutputType) -> ResolvedWatchConfig {
        let defaults = DefaultProvider::new(output_type, self.tool.clone(), self.script.clone());
        let file = FileProvider::in_root(&self.root, defaults.config());

        let reason = match file.provide() {
            Ok(Some(config)) => {
                tracing::debug!(path = %file.path().display(), "using user watch config");
                return ResolvedWatchConfig {
                    config,
                    source: ConfigSource::User(file.path().to_path_buf()),
                };
            }
            Ok(None) => {
                tracing::info!("no user watch config, using defaults");
                FallbackReason::Missing
            }
            Err(ConfigError::Io(e)) => {
                tracing::warn!(path = %file.path().display(), error = %e, "cannot read watch config");
                FallbackReason::Unreadable(e.to_string())
            }
            Err(e) => {
                tracing::warn!(path = %file.path().display(), error = %e, "invalid watch config");
                FallbackReason::Invalid(e.to_string())
            }
        };

        ResolvedWatchConfig {
            config: defaults.config(),
            source: ConfigSource::Default(reason),
        }
    }
}
