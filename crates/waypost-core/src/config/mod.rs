//! Configuration types for waypost.
//!
//! A single `WaypostConfig` covers every crate. It is loaded from YAML
//! (`waypost.yaml`) or, when the file ends in `.toml`, from TOML. Every
//! section is optional and falls back to the documented defaults.

pub mod client;
pub mod persister;
pub mod resolver;
pub mod sink;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use client::ClientConfig;
pub use persister::PersisterConfig;
pub use resolver::{DEFAULT_ENDPOINTS, ResolverConfig};
pub use sink::{SinkBackend, SinkConfig};

/// Complete waypost configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaypostConfig {
    /// Address resolver settings.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Readiness wait settings.
    #[serde(default)]
    pub persister: PersisterConfig,

    /// Primary sink settings.
    #[serde(default)]
    pub sink: SinkConfig,

    /// Client context settings.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WaypostConfig {
    /// Load configuration from a file. `.toml` files are parsed as TOML,
    /// everything else as YAML. The result is validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = if path.extension().is_some_and(|e| e == "toml") {
            Self::from_toml(&content)?
        } else {
            Self::from_yaml(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Parse configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Check the values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.attempt_timeout_ms == 0 {
            return Err(ConfigError::Config(
                "resolver.attempt_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(pos) = self
            .resolver
            .endpoints
            .iter()
            .position(|e| e.trim().is_empty())
        {
            return Err(ConfigError::Config(format!(
                "resolver.endpoints[{}] is empty",
                pos
            )));
        }
        if self.persister.poll_interval_ms == 0 {
            return Err(ConfigError::Config(
                "persister.poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.persister.poll_interval_ms > self.persister.max_wait_ms {
            return Err(ConfigError::Config(format!(
                "persister.poll_interval_ms ({}) exceeds persister.max_wait_ms ({})",
                self.persister.poll_interval_ms, self.persister.max_wait_ms
            )));
        }
        if self.sink.backend == SinkBackend::File && self.sink.file_path.is_none() {
            return Err(ConfigError::Config(
                "sink.file_path is required for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}
