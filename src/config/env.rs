//! Environment variable overrides, applied after the config file.

use super::types::{Config, ConfigError};
use std::net::SocketAddr;

pub const DATA_SOURCE_NAME: &str = "DATA_SOURCE_NAME";
pub const LISTEN_ADDRESS: &str = "PGB_EXPORTER_WEB_LISTEN_ADDRESS";
pub const TELEMETRY_PATH: &str = "PGB_EXPORTER_WEB_TELEMETRY_PATH";

impl Config {
    /// Apply overrides from the process environment. Empty values are ignored.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

        if let Some(dsn) = get(DATA_SOURCE_NAME) {
            self.exporter.data_source_name = dsn;
        }
        if let Some(addr) = get(LISTEN_ADDRESS) {
            self.web.listen_address =
                parse_listen_address(&addr).map_err(|reason| ConfigError::Env {
                    var: LISTEN_ADDRESS,
                    reason,
                })?;
        }
        if let Some(path) = get(TELEMETRY_PATH) {
            self.web.telemetry_path = path;
        }
        Ok(())
    }
}

/// Parse a listen address. A bare `:port` binds every interface.
pub fn parse_listen_address(addr: &str) -> Result<SocketAddr, String> {
    let addr = addr.trim();
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_string(),
    };
    full.parse()
        .map_err(|e| format!("`{addr}` is not a socket address: {e}"))
}
