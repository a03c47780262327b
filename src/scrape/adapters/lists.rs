//! `SHOW LISTS`: one gauge per internal list.

use super::last_wins;
use crate::admin::Row;
use crate::error::ScrapeError;
use crate::scrape::registry::{DescriptorRegistry, Sample, list_metric_name};
use tracing::debug;

pub(super) fn map(rows: &[Row], registry: &DescriptorRegistry) -> Result<Vec<Sample>, ScrapeError> {
    let entries = rows
        .iter()
        .map(|row| (row.get(0).to_label(), row.get(1).to_float()));

    let mut samples = Vec::with_capacity(rows.len());
    for (key, value) in last_wins(entries) {
        let name = list_metric_name(&key);
        // Newer pgbouncer releases grow the list; unknown keys are data, not bugs.
        if !registry.contains(&name) {
            debug!(key = %key, "Skipping unregistered SHOW LISTS key");
            continue;
        }
        samples.push(registry.sample(&name, value, Vec::new())?);
    }
    Ok(samples)
}
