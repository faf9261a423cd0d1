//! Configuration for the negotiator

use persist_types::PERSISTENT_STORAGE;
use serde::{Deserialize, Serialize};

/// Negotiator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiatorConfig {
    /// Capability name passed to the permission authority
    #[serde(default = "default_capability_name")]
    pub capability_name: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            capability_name: default_capability_name(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_capability_name() -> String {
    PERSISTENT_STORAGE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl NegotiatorConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `PERSIST__*` environment variables.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&NegotiatorConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PERSIST")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.capability_name.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "capability_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Use a different capability name
    pub fn with_capability_name(mut self, name: impl Into<String>) -> Self {
        self.capability_name = name.into();
        self
    }
}
