// Configuration Management
//
// This crate handles configuration loading for the agents test kit.
// It provides:
// - Configuration structs and deserialization
// - Environment and file loading logic
// - Default configuration values
//
// The fakes themselves never read the environment; callers load a config
// here and pass it in explicitly.

use std::path::Path;
use thiserror::Error;

pub mod types;

// Re-export all configuration types
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found. Tried paths: {paths}")]
    FileNotFound { paths: String },

    #[error("Failed to read configuration file: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: String, value: String },

    #[error("Fake model delay must be a finite, non-negative number of seconds, got {0}")]
    InvalidDelay(f64),

    #[error("Unsupported log format {0:?}, expected one of: pretty, compact, json")]
    InvalidLogFormat(String),
}

/// Main configuration loading interface
impl TestkitConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: TestkitConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        // Try different config locations in order
        let config_paths = [
            "config/testkit.yaml",
            "testkit.yaml",
            "config/default.yaml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                return Self::load_from_file(path);
            }
        }

        Err(ConfigError::FileNotFound {
            paths: config_paths.join(", "),
        })
    }

    /// Check values that deserialization alone cannot reject
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fake_model.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
