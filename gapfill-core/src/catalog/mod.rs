//! Driver catalog cache.
//!
//! Maps reference designators to their playback driver and reader types. The
//! catalog is built once per run from the cabled drivers table and then only
//! read; it is handed to the resolver and executor explicitly.

mod source;
mod table;

use std::collections::HashMap;

use gapfill_model::{DriverEntry, InstrumentRef};
use tracing::info;

use crate::error::CatalogError;

pub use source::CatalogSource;
pub use table::{DRIVER_COLUMN, REFDES_COLUMN, TYPE_COLUMN};

/// Immutable lookup table of cabled instruments.
#[derive(Debug, Clone, Default)]
pub struct DriverCatalog {
    entries: Vec<DriverEntry>,
    index: HashMap<InstrumentRef, usize>,
}

impl DriverCatalog {
    /// Fetch and parse the catalog. Any failure is fatal for the run.
    pub async fn load(
        source: &CatalogSource,
        client: &reqwest::Client,
    ) -> Result<Self, CatalogError> {
        let text = source.fetch(client).await?;
        let catalog = Self::from_table(&text)?;
        info!(
            source = %source,
            instruments = catalog.len(),
            "driver catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse the whitespace-aligned drivers table.
    pub fn from_table(text: &str) -> Result<Self, CatalogError> {
        let rows = table::parse(text)?;
        let mut catalog = Self::default();
        for row in rows {
            let slot = match catalog.index.get(&row.instrument) {
                Some(&slot) => slot,
                None => {
                    let slot = catalog.entries.len();
                    catalog.index.insert(row.instrument.clone(), slot);
                    catalog
                        .entries
                        .push(DriverEntry::new(row.instrument, row.driver));
                    slot
                }
            };
            if let Some(reader) = row.reader_type {
                catalog.entries[slot].push_reader_type(&reader);
            }
        }
        if catalog.entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(catalog)
    }

    /// True when the designator appears in the table, i.e. it is cabled.
    pub fn is_known(&self, instrument: &InstrumentRef) -> bool {
        self.index.contains_key(instrument)
    }

    pub fn entry(&self, instrument: &InstrumentRef) -> Option<&DriverEntry> {
        self.index.get(instrument).map(|&slot| &self.entries[slot])
    }

    /// Driver of the first row seen for the designator.
    pub fn driver_for(&self, instrument: &InstrumentRef) -> Option<&str> {
        self.entry(instrument).map(|entry| entry.driver.as_str())
    }

    /// Reader types in table order; empty for unknown designators.
    pub fn reader_types_for(&self, instrument: &InstrumentRef) -> &[String] {
        self.entry(instrument)
            .map(|entry| entry.reader_types.as_slice())
            .unwrap_or(&[])
    }

    /// Known designators in table order.
    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentRef> {
        self.entries.iter().map(|entry| &entry.instrument)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
