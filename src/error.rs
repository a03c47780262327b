//! Unified error handling for pgbouncer-exporter.
//!
//! Scrape errors never take the process down: the orchestrator records them
//! in the health state and hands them back to the caller as a status.

use crate::admin::AdminCommand;
use thiserror::Error;

// ============================================================================
// Scrape Errors (one pass against the admin console)
// ============================================================================

/// Errors that can occur during a scrape pass.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The admin console could not be reached or the session was refused.
    #[error("failed to connect to pgbouncer: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("connecting to pgbouncer timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),

    /// A command failed or one of its rows could not be decoded.
    #[error("error retrieving rows for `{command}`: {source}")]
    Query {
        command: AdminCommand,
        #[source]
        source: sqlx::Error,
    },

    #[error("error scanning row {row} of `{command}`: expected {expected} columns, got {actual}")]
    RowWidth {
        command: AdminCommand,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A sample referenced a name that was never registered. This is a bug.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// A sample carried a different number of labels than its descriptor. Also a bug.
    #[error("metric {metric} takes {expected} label(s), got {actual}")]
    LabelArity {
        metric: String,
        expected: usize,
        actual: usize,
    },
}

impl ScrapeError {
    pub fn query(command: AdminCommand, source: sqlx::Error) -> Self {
        Self::Query { command, source }
    }

    /// Get a static error code string for log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connection(_) | Self::ConnectTimeout(_) => "connection",
            Self::Query { .. } | Self::RowWidth { .. } => "query",
            Self::UnknownMetric(_) => "unknown_metric",
            Self::LabelArity { .. } => "label_arity",
        }
    }

    /// Whether the error is a defect in the exporter rather than in pgbouncer.
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::UnknownMetric(_) | Self::LabelArity { .. })
    }

    /// Whether the admin session should be discarded after this error.
    pub fn poisons_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::ConnectTimeout(_) | Self::Query { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_error_codes() {
        let err = ScrapeError::query(AdminCommand::Stats, sqlx::Error::RowNotFound);
        assert_eq!(err.error_code(), "query");

        let err = ScrapeError::RowWidth {
            command: AdminCommand::Pools,
            row: 0,
            expected: 12,
            actual: 13,
        };
        assert_eq!(err.error_code(), "query");
        assert!(!err.poisons_connection());
        assert!(!err.is_defect());

        let err = ScrapeError::UnknownMetric("pgbouncer_bogus".into());
        assert_eq!(err.error_code(), "unknown_metric");
        assert!(err.is_defect());

        let err = ScrapeError::LabelArity {
            metric: "pgbouncer_pool_cl_active".into(),
            expected: 2,
            actual: 1,
        };
        assert_eq!(err.error_code(), "label_arity");
        assert!(err.is_defect());
        assert!(!err.poisons_connection());
    }

    #[test]
    fn test_query_error_mentions_command() {
        let err = ScrapeError::query(AdminCommand::Mem, sqlx::Error::PoolClosed);
        assert!(err.to_string().contains("SHOW MEM"));
    }
}
