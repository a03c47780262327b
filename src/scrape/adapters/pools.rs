//! `SHOW POOLS`: client and server connection states per (database, user).

use super::POOL_COLUMNS;
use crate::admin::Row;
use crate::error::ScrapeError;
use crate::scrape::registry::{DescriptorRegistry, Sample, pool_metric_name};

pub(super) fn map(rows: &[Row], registry: &DescriptorRegistry) -> Result<Vec<Sample>, ScrapeError> {
    let mut samples = Vec::with_capacity(rows.len() * POOL_COLUMNS.len());
    for row in rows {
        let database = row.get(0).to_label();
        let user = row.get(1).to_label();
        for (idx, column) in POOL_COLUMNS {
            samples.push(registry.sample(
                &pool_metric_name(column),
                row.get(idx).to_float(),
                vec![database.clone(), user.clone()],
            )?);
        }
    }
    Ok(samples)
}
