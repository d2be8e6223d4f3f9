//! Configuration for the metering backend.
//!
//! Everything is driven by a single TOML file; every section has defaults,
//! so an empty file is a working local configuration.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/tollgate/tollgate.db"
//!
//! [analytics]
//! max_age_hours = 6
//! refresh_interval_secs = 3600
//! ```

mod analytics;
mod database;
mod logging;
mod server;

use std::path::Path;

pub use analytics::AnalyticsConfig;
pub use database::DatabaseConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use thiserror::Error;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TollgateConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Analytics cache and background refresh configuration.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TollgateConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: TollgateConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.analytics.validate()?;
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
