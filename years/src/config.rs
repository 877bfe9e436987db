//! Settings for the `years` binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::time::ParserConfig;
use crate::voyager::TraverseOptions;

/// Names the JSON settings file.
pub const CONFIG_ENV: &str = "YEARS_CONFIG";
/// Overrides [`Settings::root`].
pub const ROOT_ENV: &str = "YEARS_ROOT";
/// Overrides [`Settings::layout`].
pub const LAYOUT_ENV: &str = "YEARS_LAYOUT";
/// Comma-separated parser layouts, replacing the configured ones.
pub const LAYOUTS_ENV: &str = "YEARS_LAYOUTS";

/// Error loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required setting has no value.
    #[error("missing setting: {0}")]
    Missing(&'static str),
}

/// Where to look, how it is laid out, and how to walk it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the hierarchy.
    pub root: PathBuf,

    /// `/`-separated layout, one segment per level, e.g. `2006/01/02.txt`.
    pub layout: String,

    /// Parser used for queries.
    pub parser: ParserConfig,

    pub traverse: TraverseOptions,
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Settings from the file named by `YEARS_CONFIG` (if any), then the
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with variables read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = match lookup(CONFIG_ENV).filter(|p| !p.is_empty()) {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(lookup);
        settings.validate()?;
        Ok(settings)
    }

    /// Replace fields with the environment variables that are set.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(root) = lookup(ROOT_ENV) {
            self.root = PathBuf::from(root);
        }
        if let Some(layout) = lookup(LAYOUT_ENV) {
            self.layout = layout;
        }
        if let Some(layouts) = lookup(LAYOUTS_ENV) {
            self.parser.layouts = layouts
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// Both the root and the layout must be set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Missing("root"));
        }
        if self.layout.is_empty() {
            return Err(ConfigError::Missing("layout"));
        }
        Ok(())
    }
}
