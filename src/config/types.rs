//! Core configuration types and loading.

use super::defaults::{
    default_connect_timeout_secs, default_data_source_name, default_listen_address,
    default_telemetry_path,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },
}

/// Exporter configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Admin console connection.
    #[serde(default)]
    pub exporter: ExporterConfig,
    /// HTTP listener.
    #[serde(default)]
    pub web: WebConfig,
    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Admin console connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// `postgres://` URL or libpq keyword string for the admin database.
    #[serde(default = "default_data_source_name")]
    pub data_source_name: String,
    /// Seconds to wait for the admin console to accept a session (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ExporterConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            data_source_name: default_data_source_name(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Address to listen on (default: 0.0.0.0:9186).
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    /// Path under which metrics are served (default: /debug/metrics).
    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            telemetry_path: default_telemetry_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
}
