//! Exporter self-health carried across scrape passes.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Liveness and bookkeeping for the most recent pass.
///
/// Only the scrape orchestrator holds one of these, and only touches it
/// while its lock is held.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthState {
    up: bool,
    last_scrape_duration: Duration,
    last_scrape_timestamp: Option<DateTime<Utc>>,
    total_scrape_count: u64,
    total_error_count: u64,
}

impl HealthState {
    /// Record the end of a pass. Called exactly once per pass.
    pub fn update(&mut self, started: DateTime<Utc>, duration: Duration, succeeded: bool) {
        self.up = succeeded;
        self.last_scrape_duration = duration;
        self.last_scrape_timestamp = Some(
            chrono::Duration::from_std(duration)
                .ok()
                .and_then(|d| started.checked_add_signed(d))
                .unwrap_or(started),
        );
        self.total_scrape_count += 1;
        if !succeeded {
            self.total_error_count += 1;
        }
    }

    pub fn up(&self) -> bool {
        self.up
    }

    pub fn last_scrape_duration(&self) -> Duration {
        self.last_scrape_duration
    }

    pub fn last_scrape_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_scrape_timestamp
    }

    pub fn total_scrape_count(&self) -> u64 {
        self.total_scrape_count
    }

    pub fn total_error_count(&self) -> u64 {
        self.total_error_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_update_counts_and_liveness() {
        let started = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut health = HealthState::default();

        health.update(started, Duration::from_millis(250), true);
        assert!(health.up());
        assert_eq!(health.total_scrape_count(), 1);
        assert_eq!(health.total_error_count(), 0);

        health.update(started, Duration::from_millis(10), false);
        assert!(!health.up());
        assert_eq!(health.total_scrape_count(), 2);
        assert_eq!(health.total_error_count(), 1);
        assert_eq!(health.last_scrape_duration(), Duration::from_millis(10));
    }

    #[test]
    fn test_last_timestamp_is_end_of_pass() {
        let started = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut health = HealthState::default();
        health.update(started, Duration::from_secs(2), true);
        assert_eq!(
            health.last_scrape_timestamp(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 2).unwrap())
        );
    }
}
