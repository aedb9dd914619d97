//! Root configuration type.

use std::net::SocketAddr;

use mortar_telemetry::LogLevel;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, ServerConfig};

/// Complete Mortar server configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use mortar_config::MortarConfig;
///
/// let config = MortarConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MortarConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MortarConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `server.http_addr` is not a socket address
    /// - `server.body_read_timeout_ms` is zero
    /// - `logging.level` is not an accepted level name
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.body_read_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.body_read_timeout_ms",
                "must be greater than zero",
            ));
        }

        if let Err(e) = self.logging.level.parse::<LogLevel>() {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Development preset: pretty `debug` logs with source locations.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON `info` logs.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MortarConfig::default().validate().is_ok());
        assert!(MortarConfig::development().validate().is_ok());
    }

    #[test]
    fn test_invalid_addr() {
        let mut config = MortarConfig::default();
        config.server.http_addr = "localhost".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = MortarConfig::default();
        config.server.body_read_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_level_names() {
        let mut config = MortarConfig::default();
        for level in ["debug", "info", "warning", "error", "critical"] {
            config.logging.level = level.to_string();
            assert!(config.validate().is_ok(), "{level} should be accepted");
        }

        config.logging.level = "trace".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<MortarConfig, _> = toml::from_str("[metrics]\nenabled = true\n");
        assert!(result.is_err());
    }
}
