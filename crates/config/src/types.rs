use crate::ConfigError;
use serde::Deserialize;
use std::{collections::HashMap, env, time::Duration};

/// Default simulated latency for fake models, in seconds
pub const DEFAULT_FAKE_DELAY_SECS: f64 = 0.1;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestkitConfig {
    #[serde(default)]
    pub fake_model: FakeModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TestkitConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            fake_model: FakeModelConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }
}

/// Settings applied to every fake model a provider creates
#[derive(Debug, Clone, Deserialize)]
pub struct FakeModelConfig {
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,
}

fn default_delay_secs() -> f64 {
    DEFAULT_FAKE_DELAY_SECS
}

impl FakeModelConfig {
    /// Zero-latency settings for fast tests
    pub fn no_delay() -> Self {
        Self { delay_secs: 0.0 }
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let delay_secs = match env::var("TESTKIT_FAKE_DELAY_SECS") {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "TESTKIT_FAKE_DELAY_SECS".to_string(),
                    value,
                })?,
            Err(_) => DEFAULT_FAKE_DELAY_SECS,
        };

        let config = Self { delay_secs };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if Duration::try_from_secs_f64(self.delay_secs).is_err() {
            return Err(ConfigError::InvalidDelay(self.delay_secs));
        }
        Ok(())
    }

    /// Simulated latency as a `Duration`
    ///
    /// Values that fail validation collapse to zero.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::ZERO)
    }
}

impl Default for FakeModelConfig {
    fn default() -> Self {
        Self {
            delay_secs: DEFAULT_FAKE_DELAY_SECS,
        }
    }
}

/// Logging Configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl LoggingConfig {
    /// Load from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut modules = HashMap::new();

        // Load module-specific log levels
        if let Ok(level) = env::var("LOG_MODULE_TESTKIT") {
            modules.insert("agents_testkit".to_string(), level);
        }
        if let Ok(level) = env::var("LOG_MODULE_AGENTS") {
            modules.insert("agents".to_string(), level);
        }

        let config = Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| default_log_level()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| default_log_format()),
            modules,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.format.as_str() {
            "pretty" | "compact" | "json" => Ok(()),
            other => Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
    }

    /// Render as an env-filter directive, e.g. `info,agents_testkit=debug`
    pub fn filter_directive(&self) -> String {
        let mut filter = self.level.clone();

        // Sorted so the directive is stable across runs
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort();
        for (module, level) in modules {
            filter.push_str(&format!(",{module}={level}"));
        }

        filter
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            modules: HashMap::new(),
        }
    }
}
