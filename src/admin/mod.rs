//! PgBouncer admin console access.
//!
//! The scrape engine only sees [`AdminSource`]: something that runs one
//! `SHOW ...` command and hands back rows of untyped columns. The real
//! implementation lives in [`pg`]; tests script their own.

mod dsn;
mod pg;
mod value;

pub use dsn::parse_dsn;
pub use pg::PgAdmin;
pub use value::ColumnValue;

use crate::error::ScrapeError;
use async_trait::async_trait;
use std::fmt;

/// The admin commands issued on every pass, in scrape order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminCommand {
    Lists,
    Mem,
    Stats,
    Databases,
    Pools,
}

impl AdminCommand {
    /// Scrape order. Later commands are skipped once one fails.
    pub const ALL: [AdminCommand; 5] = [
        AdminCommand::Lists,
        AdminCommand::Mem,
        AdminCommand::Stats,
        AdminCommand::Databases,
        AdminCommand::Pools,
    ];

    pub fn sql(self) -> &'static str {
        match self {
            Self::Lists => "SHOW LISTS;",
            Self::Mem => "SHOW MEM;",
            Self::Stats => "SHOW STATS;",
            Self::Databases => "SHOW DATABASES;",
            Self::Pools => "SHOW POOLS;",
        }
    }

    /// Number of columns every row of this command carries.
    pub fn width(self) -> usize {
        match self {
            Self::Lists => 2,
            Self::Mem => 5,
            Self::Stats => 15,
            Self::Databases => 12,
            Self::Pools => 12,
        }
    }
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql().trim_end_matches(';'))
    }
}

/// One result row. Column meaning is positional and fixed per command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Vec<ColumnValue>);

impl Row {
    /// Number of columns in the row.
    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// Column at `idx`, or `Null` past the end.
    pub fn get(&self, idx: usize) -> &ColumnValue {
        self.0.get(idx).unwrap_or(&ColumnValue::Null)
    }
}

impl From<Vec<ColumnValue>> for Row {
    fn from(columns: Vec<ColumnValue>) -> Self {
        Self(columns)
    }
}

/// Executes admin commands one at a time over a single session.
#[async_trait]
pub trait AdminSource: Send {
    /// Run a command and return all of its rows.
    async fn query(&mut self, command: AdminCommand) -> Result<Vec<Row>, ScrapeError>;

    /// Drop the session, if any.
    async fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_order_and_widths() {
        let widths: Vec<usize> = AdminCommand::ALL.iter().map(|c| c.width()).collect();
        assert_eq!(widths, vec![2, 5, 15, 12, 12]);
        assert_eq!(AdminCommand::Databases.to_string(), "SHOW DATABASES");
    }

    #[test]
    fn test_row_get_past_end_is_null() {
        let row = Row::from(vec![ColumnValue::Integer(1)]);
        assert_eq!(row.get(0), &ColumnValue::Integer(1));
        assert_eq!(row.get(5), &ColumnValue::Null);
        assert_eq!(row.width(), 1);
        assert_eq!(Row::default().width(), 0);
    }
}
