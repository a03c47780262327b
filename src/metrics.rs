//! Prometheus exposition for scrape results.
//!
//! Each pass produces a flat list of [`Sample`]s; this module groups them into
//! metric families and encodes them in the Prometheus text format, together
//! with the process-wide registry (process CPU, memory and file descriptors
//! on Linux).

use crate::scrape::{MetricKind, Sample};
use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global Prometheus registry for exporter process metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Initialize the process metrics registry.
///
/// Must be called once at startup before serving requests.
pub fn init() {
    #[cfg(target_os = "linux")]
    {
        let collector = prometheus::process_collector::ProcessCollector::for_self();
        if let Err(e) = registry().register(Box::new(collector)) {
            tracing::warn!(error = %e, "Failed to register process collector");
        }
    }
}

/// Content type of [`gather_metrics`] output.
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Group samples into metric families, in first-seen order.
///
/// Descriptors that produced no sample this pass are absent.
pub fn families(samples: &[Sample]) -> Vec<MetricFamily> {
    let mut families: Vec<MetricFamily> = Vec::new();
    let mut metrics: Vec<Vec<Metric>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in samples {
        let slot = *index.entry(sample.name()).or_insert_with(|| {
            let descriptor = &sample.descriptor;
            let mut family = MetricFamily::default();
            family.set_name(descriptor.name.clone());
            family.set_help(descriptor.help.clone());
            family.set_field_type(match descriptor.kind {
                MetricKind::Gauge => MetricType::GAUGE,
                MetricKind::Counter => MetricType::COUNTER,
            });
            families.push(family);
            metrics.push(Vec::new());
            families.len() - 1
        });
        metrics[slot].push(metric(sample));
    }

    for (family, metrics) in families.iter_mut().zip(metrics) {
        family.set_metric(metrics.into());
    }
    families
}

fn metric(sample: &Sample) -> Metric {
    let labels: Vec<LabelPair> = sample
        .descriptor
        .label_names
        .iter()
        .zip(&sample.labels)
        .map(|(name, value)| {
            let mut pair = LabelPair::default();
            pair.set_name((*name).to_string());
            pair.set_value(value.clone());
            pair
        })
        .collect();

    let mut metric = Metric::default();
    metric.set_label(labels.into());
    match sample.kind() {
        MetricKind::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(sample.value);
            metric.set_gauge(gauge);
        }
        MetricKind::Counter => {
            let mut counter = Counter::default();
            counter.set_value(sample.value);
            metric.set_counter(counter);
        }
    }
    metric
}

/// Encode a pass's samples plus the process registry in Prometheus text format.
pub fn gather_metrics(samples: &[Sample]) -> String {
    let encoder = TextEncoder::new();
    let mut metric_families = families(samples);
    metric_families.extend(registry().gather());

    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}
