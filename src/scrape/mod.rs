//! The scrape engine.
//!
//! A collection request calls [`Exporter::scrape`], which runs every admin
//! command in [`AdminCommand::ALL`] order under one lock, stops at the first
//! failure, and always finishes by emitting the exporter's own health.

pub mod adapters;
pub mod health;
pub mod registry;

pub use health::HealthState;
pub use registry::{DescriptorRegistry, MetricKind, Sample};

use crate::admin::{AdminCommand, AdminSource, ColumnValue};
use crate::error::ScrapeError;
use crate::telemetry::{ScrapeTimer, spans};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrapePhase {
    Idle,
    Running,
    Done,
}

struct Inner<S> {
    source: S,
    health: HealthState,
    phase: ScrapePhase,
}

/// Serializes scrape passes over a single admin session.
pub struct Exporter<S> {
    registry: Arc<DescriptorRegistry>,
    inner: Mutex<Inner<S>>,
}

impl<S: AdminSource> Exporter<S> {
    pub fn new(source: S, registry: Arc<DescriptorRegistry>) -> Self {
        Self {
            registry,
            inner: Mutex::new(Inner {
                source,
                health: HealthState::default(),
                phase: ScrapePhase::Idle,
            }),
        }
    }

    /// Run one pass, pushing samples into `sink` as each command completes.
    ///
    /// Samples from commands that finished before a failure stay in `sink`.
    /// The five health samples are always appended last. The returned error
    /// is a status for the caller; the exporter stays usable either way.
    pub async fn scrape(&self, sink: &mut Vec<Sample>) -> Result<(), ScrapeError> {
        let mut inner = self.inner.lock().await;
        let span = spans::scrape(inner.health.total_scrape_count() + 1);
        self.run_pass(&mut inner, sink).instrument(span).await
    }

    /// Close the admin session. The next pass reconnects.
    pub async fn close(&self) {
        self.inner.lock().await.source.close().await;
    }

    async fn run_pass(
        &self,
        inner: &mut Inner<S>,
        sink: &mut Vec<Sample>,
    ) -> Result<(), ScrapeError> {
        if inner.phase == ScrapePhase::Running {
            warn!("Previous scrape pass did not complete");
        }
        inner.phase = ScrapePhase::Running;
        let timer = ScrapeTimer::start();
        let first = sink.len();

        let mut outcome = Ok(());
        for command in AdminCommand::ALL {
            let span = spans::command(command.sql());
            match adapters::run(command, &mut inner.source, &self.registry)
                .instrument(span)
                .await
            {
                Ok(samples) => sink.extend(samples),
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        let duration = timer.elapsed();
        inner.phase = ScrapePhase::Done;
        inner
            .health
            .update(timer.started_at(), duration, outcome.is_ok());

        match &outcome {
            Ok(()) => debug!(
                duration_ms = duration.as_millis() as u64,
                samples = sink.len() - first,
                "Scrape completed"
            ),
            Err(e) if e.is_defect() => {
                error!(error = %e, code = e.error_code(), "Scrape produced an invalid sample")
            }
            Err(e) => warn!(error = %e, code = e.error_code(), "Scrape failed"),
        }

        self.emit_health(&inner.health, sink);
        outcome
    }

    fn emit_health(&self, health: &HealthState, sink: &mut Vec<Sample>) {
        let readings = [
            (registry::UP, ColumnValue::Bool(health.up())),
            (
                registry::SCRAPE_DURATION,
                ColumnValue::Duration(health.last_scrape_duration()),
            ),
            (
                registry::SCRAPE_LAST_TIME,
                health
                    .last_scrape_timestamp()
                    .map_or(ColumnValue::Null, ColumnValue::Timestamp),
            ),
            (
                registry::SCRAPE_TOTAL,
                ColumnValue::Integer(health.total_scrape_count() as i64),
            ),
            (
                registry::SCRAPE_ERROR_COUNT,
                ColumnValue::Integer(health.total_error_count() as i64),
            ),
        ];

        for (name, reading) in readings {
            match self.registry.sample(name, reading.to_float(), Vec::new()) {
                Ok(sample) => sink.push(sample),
                Err(e) => error!(error = %e, "Health metric missing from registry"),
            }
        }
    }
}

impl<S: AdminSource + 'static> Exporter<S> {
    /// Run one pass on its own task and return everything it produced.
    ///
    /// The pass completes and updates health even if the caller stops
    /// waiting, e.g. when the HTTP client hangs up on a scrape timeout.
    pub async fn collect(self: &Arc<Self>) -> Vec<Sample> {
        let exporter = Arc::clone(self);
        let pass = tokio::spawn(async move {
            let mut samples = Vec::new();
            // Failures are already logged and reflected in the health samples.
            let _ = exporter.scrape(&mut samples).await;
            samples
        });

        match pass.await {
            Ok(samples) => samples,
            Err(e) => {
                error!(error = %e, "Scrape task did not complete");
                Vec::new()
            }
        }
    }
}
