//! Admin console session over the PostgreSQL wire protocol.

use super::{AdminCommand, AdminSource, ColumnValue, Row};
use crate::error::ScrapeError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{ConnectOptions, Connection, Executor, Row as _, TypeInfo, ValueRef};
use std::time::Duration;
use tracing::{debug, info};

/// A single, non-pooled admin console session.
///
/// The session is opened lazily and discarded after a failed command, so the
/// next pass starts over with a fresh connection.
pub struct PgAdmin {
    options: PgConnectOptions,
    connect_timeout: Duration,
    conn: Option<PgConnection>,
}

impl PgAdmin {
    pub fn new(options: PgConnectOptions, connect_timeout: Duration) -> Self {
        Self {
            options,
            connect_timeout,
            conn: None,
        }
    }

    /// Open the session if it is not open yet.
    pub async fn connect(&mut self) -> Result<(), ScrapeError> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&mut self) -> Result<&mut PgConnection, ScrapeError> {
        if self.conn.is_none() {
            let mut conn = tokio::time::timeout(self.connect_timeout, self.options.connect())
                .await
                .map_err(|_| ScrapeError::ConnectTimeout(self.connect_timeout))?
                .map_err(ScrapeError::Connection)?;

            // Older releases answer SHOW VERSION with a notice instead of a row,
            // which still proves the session works.
            Executor::execute(&mut conn, sqlx::raw_sql("SHOW VERSION;"))
                .await
                .map_err(ScrapeError::Connection)?;

            info!(
                host = %self.options.get_host(),
                port = self.options.get_port(),
                "Connected to pgbouncer admin console"
            );
            self.conn = Some(conn);
        }

        self.conn
            .as_mut()
            .ok_or_else(|| ScrapeError::Connection(sqlx::Error::PoolClosed))
    }
}

#[async_trait]
impl AdminSource for PgAdmin {
    async fn query(&mut self, command: AdminCommand) -> Result<Vec<Row>, ScrapeError> {
        let conn = self.connection().await?;
        let result = Executor::fetch_all(&mut *conn, sqlx::raw_sql(command.sql()))
            .await
            .map_err(|e| ScrapeError::query(command, e))
            .and_then(|rows| {
                rows.iter()
                    .map(decode_row)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ScrapeError::query(command, e))
            });

        if let Err(ref e) = result
            && e.poisons_connection()
        {
            debug!(command = %command, "Dropping admin session after failed command");
            self.conn = None;
        }
        result
    }

    async fn close(&mut self) {
        if let Some(conn) = self.conn.take()
            && let Err(e) = conn.close().await
        {
            debug!(error = %e, "Error while closing admin session");
        }
    }
}

fn decode_row(row: &PgRow) -> Result<Row, sqlx::Error> {
    (0..row.len())
        .map(|idx| decode_column(row, idx))
        .collect::<Result<Vec<_>, _>>()
        .map(Row)
}

/// Decode one column by the type the admin console reports for it.
///
/// Simple-query results arrive in text format; anything without a native
/// mapping (NUMERIC included) is kept as text and parsed during coercion.
fn decode_column(row: &PgRow, idx: usize) -> Result<ColumnValue, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(ColumnValue::Null);
    }
    let type_name = raw.type_info().name().to_owned();

    let value = match type_name.as_str() {
        "INT2" => ColumnValue::Integer(row.try_get::<i16, _>(idx)?.into()),
        "INT4" => ColumnValue::Integer(row.try_get::<i32, _>(idx)?.into()),
        "INT8" => ColumnValue::Integer(row.try_get::<i64, _>(idx)?),
        "FLOAT4" => ColumnValue::Float(row.try_get::<f32, _>(idx)?.into()),
        "FLOAT8" => ColumnValue::Float(row.try_get::<f64, _>(idx)?),
        "BOOL" => ColumnValue::Bool(row.try_get::<bool, _>(idx)?),
        "BYTEA" => ColumnValue::Bytes(row.try_get::<Vec<u8>, _>(idx)?),
        "TIMESTAMPTZ" => ColumnValue::Timestamp(row.try_get::<DateTime<Utc>, _>(idx)?),
        "TIMESTAMP" => ColumnValue::Timestamp(row.try_get::<NaiveDateTime, _>(idx)?.and_utc()),
        _ => ColumnValue::Text(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}
