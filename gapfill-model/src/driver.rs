use crate::instrument::InstrumentRef;

/// Driver catalog row(s) for one instrument, folded together.
///
/// `reader_types` keeps first-seen order with duplicates removed. An empty
/// list means no playback reader is known, so nothing can be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverEntry {
    pub instrument: InstrumentRef,
    pub driver: String,
    pub reader_types: Vec<String>,
}

impl DriverEntry {
    pub fn new(instrument: InstrumentRef, driver: impl Into<String>) -> Self {
        Self {
            instrument,
            driver: driver.into(),
            reader_types: Vec::new(),
        }
    }

    /// Append a reader type unless it is already present.
    pub fn push_reader_type(&mut self, reader: &str) {
        if !self.reader_types.iter().any(|known| known == reader) {
            self.reader_types.push(reader.to_string());
        }
    }
}
