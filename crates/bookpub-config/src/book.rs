//! Project configuration (`book.config.yml`).
//!
//! Priority: environment (`BOOKPUB_BOOK_*`) > `book.config.yml` > defaults.

use figment::{
    providers::{Env, Format as _, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Conventional name of the project configuration file.
pub const BOOK_CONFIG_FILE: &str = "book.config.yml";

/// Book metadata consumed by the conversion step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// BCP 47 language tag written to `<html lang>`
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Stylesheets linked from the generated entry file, relative to the manuscript
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stylesheets: Vec<PathBuf>,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: None,
            author: None,
            language: default_language(),
            description: None,
            stylesheets: Vec::new(),
        }
    }
}

impl BookConfig {
    /// Load `book.config.yml` from the project root.
    ///
    /// Returns `Ok(None)` when the project has no configuration file. A file
    /// that exists but cannot be parsed is reported as [`ConfigError::Malformed`].
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(BOOK_CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("BOOKPUB_BOOK_"))
            .extract()
            .map_err(|e| ConfigError::malformed(path, e))
    }

    /// Render the configuration as YAML-compatible text for new projects.
    pub fn example_yaml(title: &str) -> String {
        format!(
            "# Book metadata used when building the manuscript\n\
             title: \"{}\"\n\
             author: \"\"\n\
             language: en\n\
             stylesheets:\n  - style.css\n",
            title.replace('"', "\\\"")
        )
    }
}

fn default_title() -> String {
    "Untitled".to_string()
}

fn default_language() -> String {
    "en".to_string()
}
