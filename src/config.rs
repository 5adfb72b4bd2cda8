//! Configuration
//!
//! Loaded from YAML. Every field has a default, so an empty file (or no
//! file at all) yields a working configuration.

use crate::layout::LayoutParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutParams,
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
}

/// External generation command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Program to run; generation is unavailable when unset
    pub command: Option<String>,
    pub args: Vec<String>,
    pub timeout_secs: u64,
    /// Characters of the report included in extraction prompts
    pub document_char_limit: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_secs: 30,
            document_char_limit: 8000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured database path, else `<data_dir>/kgraph/kgraph.db`
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(default_db_path)
    }
}

/// Platform default database location
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("kgraph").join("kgraph.db")
}

impl Config {
    /// Read, parse and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> ConfigResult<Self> {
        // serde_yaml reads an empty document as unit, not as an empty map
        let config: Config = if text.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let layout = &self.layout;
        if !(layout.width > 0.0 && layout.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "viewport must be positive, got {}x{}",
                layout.width, layout.height
            )));
        }
        if !(layout.link_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "link_distance must be positive, got {}",
                layout.link_distance
            )));
        }
        if !(layout.min_zoom > 0.0 && layout.min_zoom <= layout.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min_zoom <= max_zoom, got [{}, {}]",
                layout.min_zoom, layout.max_zoom
            )));
        }
        if !(0.0..=1.0).contains(&layout.velocity_decay) {
            return Err(ConfigError::Invalid(format!(
                "velocity_decay must be within [0, 1], got {}",
                layout.velocity_decay
            )));
        }
        Ok(())
    }
}
