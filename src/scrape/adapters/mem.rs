//! `SHOW MEM`: bytes held by each internal memory cache.

use super::last_wins;
use crate::admin::Row;
use crate::error::ScrapeError;
use crate::scrape::registry::{DescriptorRegistry, MEMORY_USAGE, Sample};

const NAME_COLUMN: usize = 0;
const MEMTOTAL_COLUMN: usize = 4;

pub(super) fn map(rows: &[Row], registry: &DescriptorRegistry) -> Result<Vec<Sample>, ScrapeError> {
    let entries = rows.iter().map(|row| {
        (
            row.get(NAME_COLUMN).to_label(),
            row.get(MEMTOTAL_COLUMN).to_float(),
        )
    });

    last_wins(entries)
        .into_iter()
        .map(|(pool, bytes)| registry.sample(MEMORY_USAGE, bytes, vec![pool]))
        .collect()
}
