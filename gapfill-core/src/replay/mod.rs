//! Replay executor.
//!
//! Walks reader types (outer) and slices (inner) for one instrument, resolves
//! the data glob for each pair, and runs the player once per pair that has
//! data on disk. Every invocation is isolated: a timeout or spawn failure is
//! logged and the walk moves on.

mod command;
mod invoker;
mod pattern;

use std::path::PathBuf;
use std::time::Instant;

use gapfill_model::{InstrumentRef, ReplayTask, TimeSlice};
use tracing::{debug, info, warn};

use crate::catalog::DriverCatalog;

pub use command::{PlaybackCommand, SinkAddresses};
pub use invoker::{
    DEFAULT_REPLAY_TIMEOUT, InvocationOutcome, Invoker, ProcessInvoker,
    TimeoutPolicy,
};
pub use pattern::DataPattern;

/// Default name of the player executable.
pub const DEFAULT_PLAYER: &str = "playback";

/// Static inputs of the executor shared by every instrument in a run.
#[derive(Debug, Clone)]
pub struct ReplaySettings {
    pub data_root: PathBuf,
    pub program: String,
    pub sinks: SinkAddresses,
}

/// Per-instrument tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub invocations: usize,
    pub completed: usize,
    pub timeouts: usize,
    pub failures: usize,
    pub skipped_no_data: usize,
}

impl ReplaySummary {
    pub fn absorb(&mut self, other: ReplaySummary) {
        self.invocations += other.invocations;
        self.completed += other.completed;
        self.timeouts += other.timeouts;
        self.failures += other.failures;
        self.skipped_no_data += other.skipped_no_data;
    }
}

#[derive(Debug)]
pub struct ReplayExecutor<'a, I: ?Sized> {
    catalog: &'a DriverCatalog,
    invoker: &'a I,
    settings: &'a ReplaySettings,
}

impl<'a, I: Invoker + ?Sized> ReplayExecutor<'a, I> {
    pub fn new(
        catalog: &'a DriverCatalog,
        invoker: &'a I,
        settings: &'a ReplaySettings,
    ) -> Self {
        Self {
            catalog,
            invoker,
            settings,
        }
    }

    /// Replay `slices` for `instrument` with every known reader type.
    pub async fn run(
        &self,
        instrument: &InstrumentRef,
        slices: &[TimeSlice],
    ) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        let Some(entry) = self.catalog.entry(instrument) else {
            warn!(%instrument, "no driver catalog entry, nothing to replay");
            return summary;
        };
        if entry.reader_types.is_empty() {
            debug!(%instrument, "no reader types known, nothing to replay");
            return summary;
        }

        for reader in &entry.reader_types {
            for slice in slices {
                let pattern =
                    DataPattern::new(&self.settings.data_root, instrument, slice);
                if pattern.matches().await.is_empty() {
                    debug!(%instrument, reader = %reader, %slice, "no data on disk");
                    summary.skipped_no_data += 1;
                    continue;
                }

                let task = ReplayTask {
                    instrument: instrument.clone(),
                    driver: entry.driver.clone(),
                    reader_type: reader.clone(),
                    slice: *slice,
                    data_pattern: pattern.as_glob(),
                };
                let command = PlaybackCommand::for_task(
                    &self.settings.program,
                    &task,
                    &self.settings.sinks,
                );
                info!("{command}");

                summary.invocations += 1;
                let started = Instant::now();
                match self.invoker.invoke(&command).await {
                    InvocationOutcome::Completed { status } => {
                        summary.completed += 1;
                        debug!(
                            %instrument,
                            reader = %reader,
                            %slice,
                            %status,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "playback finished"
                        );
                    }
                    InvocationOutcome::TimedOut => {
                        summary.timeouts += 1;
                        warn!(
                            "{command} took more than {} seconds, timing out this ingestion",
                            self.invoker.timeout().as_secs()
                        );
                    }
                    InvocationOutcome::Failed { error } => {
                        summary.failures += 1;
                        warn!(
                            %instrument,
                            reader = %reader,
                            %slice,
                            %error,
                            "playback did not run"
                        );
                    }
                }
            }
        }
        summary
    }
}
