//! Configuration management for the CLI

use anyhow::{Context, Result};
use energy_lib::store::{StoreConfig, DEFAULT_MAX_MODEL_BYTES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the trained ONNX model
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected SHA-256 of the model file (hex)
    #[serde(default)]
    pub model_checksum: Option<String>,

    /// Version label reported for the model
    #[serde(default)]
    pub model_version: Option<String>,

    /// Refuse model files larger than this
    #[serde(default = "default_max_model_bytes")]
    pub max_model_bytes: usize,

    /// Default log filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("energisight_model.onnx")
}

fn default_max_model_bytes() -> usize {
    DEFAULT_MAX_MODEL_BYTES
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            model_checksum: None,
            model_version: None,
            max_model_bytes: default_max_model_bytes(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// An explicit path must exist; otherwise the per-user file is optional.
    /// `ENERGISIGHT_*` environment variables override file values.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Ok(path) = Self::config_path() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let config = builder
            .add_source(config::Environment::with_prefix("ENERGISIGHT"))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Settings for reading the model artifact
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_model_bytes: self.max_model_bytes,
            expected_checksum: self.model_checksum.clone(),
            version: self.model_version.clone(),
        }
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("energisight").join("config.toml"))
    }
}
