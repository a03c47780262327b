//! Row-to-sample mapping, one adapter per admin command.
//!
//! Adapters are all-or-nothing: a command whose rows cannot all be scanned
//! yields an error and no samples.

mod databases;
mod lists;
mod mem;
mod pools;
mod stats;

use super::registry::{DescriptorRegistry, Sample};
use crate::admin::{AdminCommand, AdminSource, Row};
use crate::error::ScrapeError;

/// `SHOW LISTS` keys with a registered gauge, and their help text.
pub const LIST_KEYS: [(&str, &str); 14] = [
    ("databases", "total database count"),
    ("users", "total users count"),
    ("peers", "total peers count"),
    ("pools", "total pools count"),
    ("peer_pools", "total peer pools count"),
    ("free_clients", "available clients count"),
    ("used_clients", "used clients count"),
    ("login_clients", "login clients count"),
    ("free_servers", "available servers count"),
    ("used_servers", "used servers count"),
    ("dns_names", "dns name count"),
    ("dns_zones", "dns zone count"),
    ("dns_queries", "dns queries count"),
    ("dns_pending", "dns pending queries count"),
];

/// `SHOW STATS` columns 1..=14, in order.
pub const STAT_COLUMNS: [&str; 14] = [
    "total_xact_count",
    "total_query_count",
    "total_received",
    "total_sent",
    "total_xact_time",
    "total_query_time",
    "total_wait_time",
    "avg_xact_count",
    "avg_query_count",
    "avg_recv",
    "avg_sent",
    "avg_xact_time",
    "avg_query_time",
    "avg_wait_time",
];

/// Exposed `SHOW DATABASES` columns by position.
pub const DATABASE_COLUMNS: [(usize, &str); 6] = [
    (5, "pool_size"),
    (6, "reserve_pool"),
    (8, "max_connections"),
    (9, "current_connections"),
    (10, "paused"),
    (11, "disabled"),
];

/// Exposed `SHOW POOLS` columns by position.
pub const POOL_COLUMNS: [(usize, &str); 9] = [
    (2, "cl_active"),
    (3, "cl_waiting"),
    (4, "sv_active"),
    (5, "sv_idle"),
    (6, "sv_used"),
    (7, "sv_tested"),
    (8, "sv_login"),
    (9, "maxwait"),
    (10, "maxwait_us"),
];

/// Run one command and map its rows.
pub async fn run<S>(
    command: AdminCommand,
    source: &mut S,
    registry: &DescriptorRegistry,
) -> Result<Vec<Sample>, ScrapeError>
where
    S: AdminSource + ?Sized,
{
    let rows = source.query(command).await?;
    map_rows(command, &rows, registry)
}

pub fn map_rows(
    command: AdminCommand,
    rows: &[Row],
    registry: &DescriptorRegistry,
) -> Result<Vec<Sample>, ScrapeError> {
    check_widths(command, rows)?;
    match command {
        AdminCommand::Lists => lists::map(rows, registry),
        AdminCommand::Mem => mem::map(rows, registry),
        AdminCommand::Stats => stats::map(rows, registry),
        AdminCommand::Databases => databases::map(rows, registry),
        AdminCommand::Pools => pools::map(rows, registry),
    }
}

fn check_widths(command: AdminCommand, rows: &[Row]) -> Result<(), ScrapeError> {
    let expected = command.width();
    match rows.iter().position(|r| r.width() != expected) {
        Some(row) => Err(ScrapeError::RowWidth {
            command,
            row,
            expected,
            actual: rows[row].width(),
        }),
        None => Ok(()),
    }
}

/// Collapse rows sharing a key, keeping the last value but the first position.
fn last_wins<V>(entries: impl IntoIterator<Item = (String, V)>) -> Vec<(String, V)> {
    let mut out: Vec<(String, V)> = Vec::new();
    for (key, value) in entries {
        match out.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => out.push((key, value)),
        }
    }
    out
}
