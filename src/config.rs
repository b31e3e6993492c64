//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.lcmv.toml` files.

use crate::error::LcmvError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".lcmv.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// File layout settings.
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Names and conventions of the ensemble file layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Group holding the numbered datasets, searched anywhere in the file.
    #[serde(default = "default_source_group")]
    pub source_group: String,

    /// Dataset written into every target group.
    #[serde(default = "default_output_dataset")]
    pub output_dataset: String,

    /// Separator between label and index in member names.
    #[serde(default = "default_key_separator")]
    pub key_separator: String,

    /// Zero-based position of the index token after splitting.
    #[serde(default = "default_key_position")]
    pub key_position: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source_group: default_source_group(),
            output_dataset: default_output_dataset(),
            key_separator: default_key_separator(),
            key_position: default_key_position(),
        }
    }
}

fn default_source_group() -> String {
    "spatial_position".to_string()
}

fn default_output_dataset() -> String {
    "live_contact_map_vertices".to_string()
}

fn default_key_separator() -> String {
    "_".to_string()
}

fn default_key_position() -> usize {
    1
}

impl LayoutConfig {
    /// Check that the configured names can address HDF5 links.
    pub fn validate(&self) -> std::result::Result<(), LcmvError> {
        for (field, value) in [
            ("source_group", &self.source_group),
            ("output_dataset", &self.output_dataset),
        ] {
            if value.is_empty() {
                return Err(LcmvError::InvalidLayout(format!("{} must not be empty", field)));
            }
            if value.contains('/') {
                return Err(LcmvError::InvalidLayout(format!(
                    "{} must be a plain name, got '{}'",
                    field, value
                )));
            }
        }

        if self.key_separator.is_empty() {
            return Err(LcmvError::InvalidLayout(
                "key_separator must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .layout
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI flags take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if args.verbose {
            self.general.verbose = true;
        }
        if args.quiet {
            self.general.verbose = false;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
