//! `SHOW DATABASES`: pool sizing and state of each configured database.

use super::DATABASE_COLUMNS;
use crate::admin::Row;
use crate::error::ScrapeError;
use crate::scrape::registry::{DescriptorRegistry, Sample, database_metric_name};

pub(super) fn map(rows: &[Row], registry: &DescriptorRegistry) -> Result<Vec<Sample>, ScrapeError> {
    let mut samples = Vec::with_capacity(rows.len() * DATABASE_COLUMNS.len());
    for row in rows {
        let database = row.get(0).to_label();
        for (idx, column) in DATABASE_COLUMNS {
            samples.push(registry.sample(
                &database_metric_name(column),
                row.get(idx).to_float(),
                vec![database.clone()],
            )?);
        }
    }
    Ok(samples)
}
