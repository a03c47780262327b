//! Telemetry utilities for scrape timing and tracing spans.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Wall-clock start plus a monotonic clock for measuring one pass.
pub struct ScrapeTimer {
    started_at: DateTime<Utc>,
    start: Instant,
}

impl ScrapeTimer {
    /// Start timing a pass.
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for one scrape pass.
    pub fn scrape(pass: u64) -> Span {
        info_span!("scrape", pass = pass)
    }

    /// Create a span for a single admin command.
    pub fn command(command: &str) -> Span {
        info_span!("command", command = %command)
    }
}
