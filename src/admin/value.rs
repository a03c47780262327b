//! Column values returned by the admin console and their coercions.
//!
//! Both coercions are total: a malformed column turns into NaN or an empty
//! label, never an error, so one bad cell cannot abort a pass.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// A single untyped column as decoded from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Duration(Duration),
    Null,
}

impl ColumnValue {
    /// Coerce to a sample value. NaN means "not a number".
    pub fn to_float(&self) -> f64 {
        match self {
            Self::Integer(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
            Self::Timestamp(ts) => ts.timestamp() as f64,
            Self::Duration(d) => d.as_nanos() as f64,
            Self::Bytes(raw) => std::str::from_utf8(raw).map_or(f64::NAN, parse_number),
            Self::Text(text) => parse_number(text),
            Self::Null => f64::NAN,
        }
    }

    /// Coerce to a label value.
    pub fn to_label(&self) -> String {
        match self {
            Self::Integer(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Bool(v) => v.to_string(),
            Self::Timestamp(ts) => ts.timestamp().to_string(),
            Self::Bytes(raw) => String::from_utf8_lossy(raw).into_owned(),
            Self::Text(text) => text.clone(),
            Self::Duration(_) | Self::Null => String::new(),
        }
    }
}

fn parse_number(text: &str) -> f64 {
    text.parse::<f64>().unwrap_or(f64::NAN)
}
