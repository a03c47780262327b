//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::admin::parse_dsn;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("exporter.data_source_name is required")]
    MissingDataSourceName,
    #[error("exporter.data_source_name is invalid: {0}")]
    InvalidDataSourceName(String),
    #[error("exporter.connect_timeout_secs must be greater than 0")]
    ZeroConnectTimeout,
    #[error("web.telemetry_path must start with '/', got '{0}'")]
    RelativeTelemetryPath(String),
    #[error("web.telemetry_path cannot be '/', which serves the landing page")]
    RootTelemetryPath,
}

impl ValidationError {
    /// Get a static error code string for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingDataSourceName | Self::InvalidDataSourceName(_) => "data_source_name",
            Self::ZeroConnectTimeout => "connect_timeout",
            Self::RelativeTelemetryPath(_) | Self::RootTelemetryPath => "telemetry_path",
        }
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let dsn = config.exporter.data_source_name.trim();
    if dsn.is_empty() {
        errors.push(ValidationError::MissingDataSourceName);
    } else if let Err(e) = parse_dsn(dsn) {
        errors.push(ValidationError::InvalidDataSourceName(e.to_string()));
    }

    if config.exporter.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    let path = &config.web.telemetry_path;
    if !path.starts_with('/') {
        errors.push(ValidationError::RelativeTelemetryPath(path.clone()));
    } else if path == "/" {
        errors.push(ValidationError::RootTelemetryPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
