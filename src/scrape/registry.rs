//! Metric descriptor registry.
//!
//! Every sample the exporter emits references a descriptor registered here.
//! The registry is assembled once at startup through [`RegistryBuilder`] and
//! is read-only afterwards, so it is shared without a lock.

use super::adapters::{DATABASE_COLUMNS, LIST_KEYS, POOL_COLUMNS, STAT_COLUMNS};
use crate::error::ScrapeError;
use std::collections::HashMap;
use std::sync::Arc;

/// Prefix shared by every exposed metric.
pub const NAMESPACE: &str = "pgbouncer";

pub const UP: &str = "pgbouncer_up";
pub const SCRAPE_DURATION: &str = "pgbouncer_scrape_duration";
pub const SCRAPE_LAST_TIME: &str = "pgbouncer_scrape_last_time";
pub const SCRAPE_TOTAL: &str = "pgbouncer_scrape_total";
pub const SCRAPE_ERROR_COUNT: &str = "pgbouncer_scrape_error_count";
pub const MEMORY_USAGE: &str = "pgbouncer_memory_usage";

pub const DATABASE_LABEL: &str = "database";
pub const USER_LABEL: &str = "user";
pub const MEMORY_LABEL: &str = "type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Static exposition metadata for one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<&'static str>,
}

/// One observation of a metric, valid for the current pass only.
#[derive(Debug, Clone)]
pub struct Sample {
    pub descriptor: Arc<MetricDescriptor>,
    pub value: f64,
    pub labels: Vec<String>,
}

impl Sample {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn kind(&self) -> MetricKind {
        self.descriptor.kind
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    order: Vec<Arc<MetricDescriptor>>,
    index: HashMap<String, usize>,
}

impl RegistryBuilder {
    /// Add a descriptor. Registering a name twice keeps the first entry.
    pub fn register(
        mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        kind: MetricKind,
        label_names: &[&'static str],
    ) -> Self {
        let name = name.into();
        if !self.index.contains_key(&name) {
            self.index.insert(name.clone(), self.order.len());
            self.order.push(Arc::new(MetricDescriptor {
                name,
                help: help.into(),
                kind,
                label_names: label_names.to_vec(),
            }));
        }
        self
    }

    pub fn build(self) -> DescriptorRegistry {
        DescriptorRegistry {
            order: self.order,
            index: self.index,
        }
    }
}

/// Immutable name → descriptor map.
#[derive(Debug)]
pub struct DescriptorRegistry {
    order: Vec<Arc<MetricDescriptor>>,
    index: HashMap<String, usize>,
}

impl DescriptorRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The full pgbouncer descriptor set.
    pub fn pgbouncer() -> Self {
        let db = &[DATABASE_LABEL];
        let pool = &[DATABASE_LABEL, USER_LABEL];

        let mut builder = Self::builder()
            .register(UP, "whether pgbouncer is alive", MetricKind::Gauge, &[])
            .register(
                SCRAPE_DURATION,
                "time that spending on scrapping, in nanoseconds",
                MetricKind::Gauge,
                &[],
            )
            .register(
                SCRAPE_LAST_TIME,
                "last timestamp of scrape in unix epoch",
                MetricKind::Gauge,
                &[],
            )
            .register(SCRAPE_TOTAL, "total scrape count", MetricKind::Counter, &[])
            .register(
                SCRAPE_ERROR_COUNT,
                "total error count when scrapping",
                MetricKind::Counter,
                &[],
            );

        for (key, help) in LIST_KEYS {
            builder = builder.register(
                list_metric_name(key),
                format!("pgbouncer {help}"),
                MetricKind::Gauge,
                &[],
            );
        }

        builder = builder.register(
            MEMORY_USAGE,
            "pgbouncer memory usage",
            MetricKind::Gauge,
            &[MEMORY_LABEL],
        );

        for column in STAT_COLUMNS {
            builder = builder.register(
                stat_metric_name(column),
                format!("pgbouncer {column} of show stats"),
                stat_kind(column),
                db,
            );
        }

        for (_, column) in DATABASE_COLUMNS {
            builder = builder.register(
                database_metric_name(column),
                format!("pgbouncer database {column} from show databases"),
                MetricKind::Gauge,
                db,
            );
        }

        for (_, column) in POOL_COLUMNS {
            builder = builder.register(
                pool_metric_name(column),
                format!("pgbouncer pool {column} from show pools"),
                MetricKind::Gauge,
                pool,
            );
        }

        builder.build()
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<MetricDescriptor>, ScrapeError> {
        self.index
            .get(name)
            .map(|&i| &self.order[i])
            .ok_or_else(|| ScrapeError::UnknownMetric(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Build a sample for a registered metric with exactly its declared labels.
    pub fn sample(
        &self,
        name: &str,
        value: f64,
        labels: Vec<String>,
    ) -> Result<Sample, ScrapeError> {
        let descriptor = self.lookup(name)?;
        if descriptor.label_names.len() != labels.len() {
            return Err(ScrapeError::LabelArity {
                metric: name.to_string(),
                expected: descriptor.label_names.len(),
                actual: labels.len(),
            });
        }
        Ok(Sample {
            descriptor: Arc::clone(descriptor),
            value,
            labels,
        })
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<MetricDescriptor>> {
        self.order.iter()
    }
}

pub fn list_metric_name(key: &str) -> String {
    format!("{NAMESPACE}_{key}")
}

pub fn stat_metric_name(column: &str) -> String {
    format!("{NAMESPACE}_stat_{column}")
}

pub fn database_metric_name(column: &str) -> String {
    format!("{NAMESPACE}_database_{column}")
}

pub fn pool_metric_name(column: &str) -> String {
    format!("{NAMESPACE}_pool_{column}")
}

/// `total_*` columns are cumulative since pgbouncer start; everything else
/// is a point-in-time average.
pub fn stat_kind(column: &str) -> MetricKind {
    if column.starts_with("total") {
        MetricKind::Counter
    } else {
        MetricKind::Gauge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pgbouncer_registry_shape() {
        let registry = DescriptorRegistry::pgbouncer();
        assert_eq!(
            registry.descriptors().count(),
            5 + LIST_KEYS.len() + 1 + STAT_COLUMNS.len() + DATABASE_COLUMNS.len() + POOL_COLUMNS.len()
        );

        let names: std::collections::HashSet<_> =
            registry.descriptors().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), registry.descriptors().count(), "descriptor names must be unique");

        for d in registry.descriptors() {
            assert!(d.name.starts_with("pgbouncer_"), "{} lacks prefix", d.name);
            assert_eq!(d.name, d.name.to_lowercase());
        }
    }

    #[test]
    fn test_label_arity_by_category() {
        let registry = DescriptorRegistry::pgbouncer();
        assert!(registry.lookup(UP).unwrap().label_names.is_empty());
        assert!(registry.lookup("pgbouncer_databases").unwrap().label_names.is_empty());
        assert_eq!(registry.lookup(MEMORY_USAGE).unwrap().label_names, vec!["type"]);
        assert_eq!(
            registry.lookup("pgbouncer_database_pool_size").unwrap().label_names,
            vec!["database"]
        );
        assert_eq!(
            registry.lookup("pgbouncer_pool_cl_active").unwrap().label_names,
            vec!["database", "user"]
        );
    }

    #[test]
    fn test_stat_kinds_follow_prefix() {
        let registry = DescriptorRegistry::pgbouncer();
        for column in STAT_COLUMNS {
            let d = registry.lookup(&stat_metric_name(column)).unwrap();
            if column.starts_with("total_") {
                assert_eq!(d.kind, MetricKind::Counter, "{column}");
            } else {
                assert!(column.starts_with("avg_"));
                assert_eq!(d.kind, MetricKind::Gauge, "{column}");
            }
        }
        assert_eq!(registry.lookup(SCRAPE_TOTAL).unwrap().kind, MetricKind::Counter);
        assert_eq!(registry.lookup(SCRAPE_ERROR_COUNT).unwrap().kind, MetricKind::Counter);
    }

    #[test]
    fn test_lookup_unknown_metric() {
        let registry = DescriptorRegistry::pgbouncer();
        let err = registry.lookup("pgbouncer_nonexistent").unwrap_err();
        assert!(matches!(err, ScrapeError::UnknownMetric(ref n) if n == "pgbouncer_nonexistent"));
    }

    #[test]
    fn test_sample_rejects_wrong_label_count() {
        let registry = DescriptorRegistry::pgbouncer();
        let err = registry
            .sample("pgbouncer_pool_cl_active", 1.0, vec!["app".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::LabelArity { expected: 2, actual: 1, .. }
        ));
        assert!(registry.sample(UP, 1.0, vec!["extra".into()]).is_err());

        let ok = registry
            .sample("pgbouncer_pool_cl_active", 1.0, vec!["app".into(), "alice".into()])
            .unwrap();
        assert_eq!(ok.labels, vec!["app", "alice"]);
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = DescriptorRegistry::builder()
            .register("pgbouncer_x", "first", MetricKind::Gauge, &[])
            .register("pgbouncer_x", "second", MetricKind::Counter, &[])
            .build();
        assert_eq!(registry.descriptors().count(), 1);
        let d = registry.lookup("pgbouncer_x").unwrap();
        assert_eq!(d.help, "first");
        assert_eq!(d.kind, MetricKind::Gauge);
    }
}
