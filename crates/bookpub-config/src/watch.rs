//! Watcher configuration model and the on-disk `bookpub.watch.json` format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Format as _, Json},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::output::OutputType;

/// Conventional name of the user watcher configuration file.
pub const WATCH_CONFIG_FILE: &str = "bookpub.watch.json";

/// Directory watched when the user does not name one.
pub const DEFAULT_WATCH_DIR: &str = "manuscript";

/// Markup, template, script, style and data formats.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "md", "mdx", "js", "ejs", "json", "html", "css", "scss", "yaml",
];

/// Quiet period used to batch file change bursts into one restart.
pub const DEFAULT_DELAY_MS: u64 = 200;

/// Resolved watcher settings for one dev session.
///
/// Built once by the resolver and never patched afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatcherConfig {
    /// Script the watcher is nominally supervising
    pub script: Option<PathBuf>,
    /// Lowercase extensions without a leading dot
    pub extensions: Vec<String>,
    /// Rebuild command used when no `execMap` entry matches
    pub exec: Option<String>,
    /// Extension to command
    pub exec_map: BTreeMap<String, String>,
    /// Watched directories, relative to the project root unless absolute
    pub watch: Vec<PathBuf>,
    pub delay: Duration,
    /// Set when the settings came from a user file
    pub config_file: Option<PathBuf>,
}

impl WatcherConfig {
    /// Default shape for an output type: watch `manuscript/` and rebuild with
    /// `<tool> build --type <type>`.
    pub fn default_for(output_type: OutputType, tool: &str, script: Option<PathBuf>) -> Self {
        Self {
            script,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exec: Some(output_type.rebuild_command(tool)),
            exec_map: BTreeMap::new(),
            watch: vec![PathBuf::from(DEFAULT_WATCH_DIR)],
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            config_file: None,
        }
    }

    pub fn is_user_supplied(&self) -> bool {
        self.config_file.is_some()
    }

    /// Absolute directories to watch.
    pub fn watch_roots(&self, root: &Path) -> Vec<PathBuf> {
        self.watch
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    root.join(dir)
                }
            })
            .collect()
    }

    /// Whether a changed path falls inside the watched extension set.
    pub fn matches(&self, path: &Path) -> bool {
        match extension_of(path) {
            Some(ext) => self.extensions.iter().any(|e| *e == ext),
            None => false,
        }
    }

    /// Command to run for a changed path: its `execMap` entry, else `exec`.
    pub fn command_for(&self, path: &Path) -> Option<&str> {
        extension_of(path)
            .and_then(|ext| self.exec_map.get(&ext))
            .or(self.exec.as_ref())
            .map(String::as_str)
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Parse a comma separated extension list (`"md, .ejs,CSS"`).
pub fn parse_extensions(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let ext = part.trim().trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

/// `"watch"` as nodemon accepts it: one directory or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WatchPaths {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl WatchPaths {
    pub fn into_vec(self) -> Vec<PathBuf> {
        match self {
            WatchPaths::One(dir) => vec![dir],
            WatchPaths::Many(dirs) => dirs,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            WatchPaths::One(dir) => dir.as_os_str().is_empty(),
            WatchPaths::Many(dirs) => dirs.iter().all(|d| d.as_os_str().is_empty()),
        }
    }
}

/// Raw contents of `bookpub.watch.json`.
///
/// Key names follow nodemon's so existing `nodemon.json` files can be renamed
/// and reused. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<WatchPaths>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exec_map: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PathBuf>,

    /// Milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<u64>,
}

impl WatchFile {
    /// Read and parse a watcher file. I/O failures surface as
    /// [`ConfigError::Io`], parse failures as [`ConfigError::Malformed`].
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        Figment::from(Json::string(content))
            .extract()
            .map_err(|e| ConfigError::malformed(path, e))
    }

    /// A watcher file is usable only when its `execMap` has an `html` entry.
    pub fn validate(&self, path: &Path) -> Result<()> {
        let html = self
            .exec_map
            .get("html")
            .ok_or_else(|| ConfigError::MissingHtmlExec(path.to_path_buf()))?;

        if html.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "execMap.html".to_string(),
                hint: Some("Provide the command to run when HTML sources change".to_string()),
            });
        }

        if self.watch.as_ref().is_some_and(WatchPaths::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: "watch".to_string(),
                hint: Some("Name at least one directory, e.g. [\"manuscript\"]".to_string()),
            });
        }

        if let Some(ext) = &self.ext {
            if parse_extensions(ext).is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "ext".to_string(),
                    hint: Some("List at least one extension, e.g. \"md,css\"".to_string()),
                });
            }
        }

        Ok(())
    }

    /// Turn a validated file into settings, filling omitted keys from `defaults`.
    pub fn into_config(self, path: &Path, defaults: WatcherConfig) -> WatcherConfig {
        WatcherConfig {
            script: self.script.or(defaults.script),
            extensions: self
                .ext
                .as_deref()
                .map(parse_extensions)
                .unwrap_or(defaults.extensions),
            // A user file without `exec` relies on its execMap alone.
            exec: self.exec,
            exec_map: self.exec_map,
            watch: self
                .watch
                .map(WatchPaths::into_vec)
                .map(|dirs| dirs.into_iter().filter(|d| !d.as_os_str().is_empty()).collect())
                .unwrap_or(defaults.watch),
            delay: self
                .delay
                .map(Duration::from_millis)
                .unwrap_or(defaults.delay),
            config_file: Some(path.to_path_buf()),
        }
    }

    /// Sample file written into new projects.
    pub fn sample() -> Self {
        let mut exec_map = BTreeMap::new();
        exec_map.insert("html".to_string(), OutputType::Html.rebuild_command("bookpub"));
        exec_map.insert("md".to_string(), OutputType::Html.rebuild_command("bookpub"));
        Self {
            watch: Some(WatchPaths::One(PathBuf::from(DEFAULT_WATCH_DIR))),
            ext: Some(DEFAULT_EXTENSIONS.join(",")),
            exec: None,
            exec_map,
            script: None,
            delay: Some(DEFAULT_DELAY_MS),
        }
    }
}
