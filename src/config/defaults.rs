//! Default value functions for configuration.

use std::net::SocketAddr;

/// Local admin console over TCP with the conventional `pgbouncer` admin user.
pub fn default_data_source_name() -> String {
    "postgres://pgbouncer@localhost:6432/pgbouncer?sslmode=disable".to_string()
}

pub fn default_connect_timeout_secs() -> u64 {
    5
}

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9186))
}

pub fn default_telemetry_path() -> String {
    "/debug/metrics".to_string()
}
