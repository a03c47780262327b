//! `SHOW STATS`: fourteen per-database traffic figures.

use super::{STAT_COLUMNS, last_wins};
use crate::admin::Row;
use crate::error::ScrapeError;
use crate::scrape::registry::{DescriptorRegistry, Sample, stat_metric_name};

pub(super) fn map(rows: &[Row], registry: &DescriptorRegistry) -> Result<Vec<Sample>, ScrapeError> {
    let per_database = rows.iter().map(|row| {
        let values: Vec<f64> = (1..=STAT_COLUMNS.len())
            .map(|idx| row.get(idx).to_float())
            .collect();
        (row.get(0).to_label(), values)
    });

    let per_database = last_wins(per_database);
    let mut samples = Vec::with_capacity(per_database.len() * STAT_COLUMNS.len());
    for (database, values) in per_database {
        for (column, value) in STAT_COLUMNS.iter().zip(values) {
            samples.push(registry.sample(&stat_metric_name(column), value, vec![database.clone()])?);
        }
    }
    Ok(samples)
}
