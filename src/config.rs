// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Local configuration file, loaded from the working directory when present.
pub const CONFIG_FILE: &str = "docuweave.toml";

fn default_data_directory() -> PathBuf {
    PathBuf::from("docudata")
}

/// A user-configured grouping of object types shown as one browsing tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomObjectTab {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub object_types: Vec<String>,
}

/// Configuration for the documentation store and aggregation run.
///
/// Passed explicitly into the aggregator; there is no ambient global lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the documentation data directory tree.
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
    /// Custom object tab groupings materialized at the end of each build.
    #[serde(default)]
    pub custom_object_tabs: Vec<CustomObjectTab>,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_directory: default_data_directory(),
            custom_object_tabs: Vec::new(),
        }
    }

    /// Loads `docuweave.toml` from the working directory, falling back to
    /// defaults when the file is absent.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
