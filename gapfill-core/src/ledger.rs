//! Durable record of replay attempts.
//!
//! The ledger remembers every `(instrument, slice)` pair that has been handed
//! to the player, across runs. It records submission, not success: a slice
//! whose playback timed out or failed stays recorded and is not retried until
//! the ledger file is cleared by hand. Entries are never removed.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use gapfill_model::{InstrumentRef, TimeSlice};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::LedgerError;

const LEDGER_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    ingests: BTreeMap<InstrumentRef, BTreeSet<TimeSlice>>,
}

/// Append-only set of attempted slices per instrument, backed by a JSON file.
#[derive(Debug)]
pub struct IngestLedger {
    path: PathBuf,
    ingests: BTreeMap<InstrumentRef, BTreeSet<TimeSlice>>,
    dirty: bool,
}

impl IngestLedger {
    /// Empty ledger that will persist to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ingests: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Read the ledger at `path`. A missing file is a first run, not an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no ingest ledger yet, starting empty");
                return Ok(Self::new(path));
            }
            Err(source) => return Err(LedgerError::Io { path, source }),
        };
        let file: LedgerFile = match serde_json::from_slice(&bytes) {
            Ok(file) => file,
            Err(source) => return Err(LedgerError::Corrupt { path, source }),
        };
        if file.version != LEDGER_VERSION {
            return Err(LedgerError::UnsupportedVersion {
                path,
                version: file.version,
            });
        }
        let ledger = Self {
            path,
            ingests: file.ingests,
            dirty: false,
        };
        info!(
            path = %ledger.path.display(),
            instruments = ledger.ingests.len(),
            attempts = ledger.len(),
            "ingest ledger loaded"
        );
        Ok(ledger)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_attempted(
        &self,
        instrument: &InstrumentRef,
        slice: &TimeSlice,
    ) -> bool {
        self.ingests
            .get(instrument)
            .is_some_and(|slices| slices.contains(slice))
    }

    /// Insert the pair; a no-op when already present.
    pub fn record_attempt(&mut self, instrument: &InstrumentRef, slice: TimeSlice) {
        let inserted = self
            .ingests
            .entry(instrument.clone())
            .or_default()
            .insert(slice);
        self.dirty |= inserted;
    }

    /// Gate for submission: records and returns `true` the first time a pair
    /// is seen, returns `false` without touching state afterwards.
    pub fn should_attempt(
        &mut self,
        instrument: &InstrumentRef,
        slice: TimeSlice,
    ) -> bool {
        if self.has_attempted(instrument, &slice) {
            return false;
        }
        self.record_attempt(instrument, slice);
        true
    }

    /// Slices attempted for `instrument`, oldest first. Empty when unknown.
    pub fn attempted(
        &self,
        instrument: &InstrumentRef,
    ) -> impl Iterator<Item = &TimeSlice> {
        self.ingests.get(instrument).into_iter().flatten()
    }

    /// Total number of recorded pairs.
    pub fn len(&self) -> usize {
        self.ingests.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when there are attempts not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the ledger atomically.
    ///
    /// The content goes to a temporary file next to the target, is synced, and
    /// then renamed over it. On any failure the temporary file is dropped and
    /// the previous ledger stays intact.
    pub fn persist(&mut self) -> Result<(), LedgerError> {
        let snapshot = LedgerFile {
            version: LEDGER_VERSION,
            ingests: self.ingests.clone(),
        };
        let encoded =
            serde_json::to_vec_pretty(&snapshot).map_err(LedgerError::Encode)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let io_err = |source| LedgerError::Io {
            path: self.path.clone(),
            source,
        };
        fs::create_dir_all(&dir).map_err(io_err)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(&encoded).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|err| io_err(err.error))?;

        self.dirty = false;
        debug!(path = %self.path.display(), attempts = self.len(), "ingest ledger persisted");
        Ok(())
    }
}
