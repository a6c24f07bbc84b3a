/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Client configuration.
//!
//! Supports both programmatic and TOML-file configuration. Every key has a
//! default, so an empty file is a valid configuration.

use crate::context::ProtocolContext;
use crate::negotiate::Negotiator;
use crate::tag;
use crate::transport::TcpTransport;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Connection and protocol settings for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Controller host name or address.
    pub host: String,

    /// TNT service port.
    pub port: u16,

    /// Connect and read timeout (seconds).
    pub timeout_secs: u64,

    /// Agent string sent in every header.
    pub agent: String,

    /// Interface version used until the server reports one.
    pub interface_version: String,

    /// Database version, if known in advance.
    pub db_version: Option<String>,

    /// Default XML namespace of the envelope.
    pub namespace: String,

    /// How many successive `<concerning>` corrections one negotiation follows.
    pub max_concerning_retries: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: tag::DEFAULT_PORT,
            timeout_secs: 20,
            agent: tag::DEFAULT_AGENT.to_string(),
            interface_version: tag::DEFAULT_INTERFACE_VERSION.to_string(),
            db_version: None,
            namespace: tag::DEFAULT_NAMESPACE.to_string(),
            max_concerning_retries: 1,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must be non-zero".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be non-zero".into()));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Initial protocol context built from the configured values.
    pub fn context(&self) -> ProtocolContext {
        ProtocolContext::new(
            &self.namespace,
            &self.interface_version,
            self.db_version.as_deref(),
            &self.agent,
        )
    }

    pub fn negotiator(&self) -> Negotiator {
        Negotiator::new(self.max_concerning_retries)
    }

    /// Unconnected TCP transport for the configured endpoint.
    pub fn transport(&self) -> TcpTransport {
        TcpTransport::new(self.host.trim(), self.port, self.timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.port, 7973);
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.max_concerning_retries, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.agent, "MW");
    }

    #[test]
    fn test_toml_overrides() {
        let config = ClientConfig::from_toml_str(
            r#"
            host = "192.168.0.70"
            agent = "line-3"
            db_version = "12"
            max_concerning_retries = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "192.168.0.70");
        assert_eq!(config.max_concerning_retries, 3);

        let ctx = config.context();
        assert_eq!(ctx.agent(), "line-3");
        assert_eq!(ctx.db_version(), Some("12"));
        assert_eq!(ctx.interface_version(), "1.15");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = ClientConfig::from_toml_str("port = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_toml_rejected() {
        let err = ClientConfig::from_toml_str("port = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8000\ntimeout_secs = 3").unwrap();
        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ClientConfig::from_file("/nonexistent/tnt.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
