//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Environment variables
//! - Configuration files (TOML)
//! - Defaults

use crate::error::{Error, Result};
use crate::settings::STATES_KEY;
use crate::state_machine::levels::DEFAULT_DISCONNECTED_GAP;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Persistent state table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persist added states between runs
    #[serde(default = "default_storage_enabled")]
    pub enabled: bool,

    /// Settings file the states are stored in
    pub path: Option<PathBuf>,

    /// Key the state table is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,
}

/// Graph layout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Levels between the main graph and states the root does not reach
    #[serde(default = "default_disconnected_gap")]
    pub disconnected_gap: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions

fn default_storage_enabled() -> bool {
    true
}

fn default_storage_key() -> String {
    STATES_KEY.to_string()
}

fn default_disconnected_gap() -> u32 {
    DEFAULT_DISCONNECTED_GAP
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: default_storage_enabled(),
            path: None,
            key: default_storage_key(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            disconnected_gap: default_disconnected_gap(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file {:?}: {}", path, e)))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./ndc-state-viz.toml
    /// 2. ~/.ndc-state-viz/config.toml
    /// 3. /etc/ndc-state-viz/config.toml
    pub fn load() -> Result<Self> {
        let mut paths = vec![PathBuf::from("ndc-state-viz.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ndc-state-viz").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/ndc-state-viz/config.toml"));

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Get the state store path from config, with fallback to the default location
    pub fn storage_path(&self) -> PathBuf {
        self.storage.path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".ndc-state-viz").join("states.json"))
                .unwrap_or_else(|| PathBuf::from("ndc-states.json"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.storage.enabled);
        assert_eq!(config.storage.key, "states");
        assert_eq!(config.layout.disconnected_gap, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[storage]
path = "/tmp/atm/states.json"
key = "ndc_states"

[layout]
disconnected_gap = 5

[logging]
level = "debug"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/atm/states.json"));
        assert_eq!(config.storage.key, "ndc_states");
        assert!(config.storage.enabled);
        assert_eq!(config.layout.disconnected_gap, 5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[layout]\ndisconnected_gap = \"wide\"\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));
    }
}
