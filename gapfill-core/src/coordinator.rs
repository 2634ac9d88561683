//! Run coordinator: catalog, gaps, ledger gate, replay.

use std::path::PathBuf;

use gapfill_model::{GapInterval, InstrumentRef, TimeSlice};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogSource, DriverCatalog};
use crate::error::{GapfillError, Result};
use crate::gaps::{GapReporter, GapResolver};
use crate::ledger::IngestLedger;
use crate::replay::{
    Invoker, ReplayExecutor, ReplaySettings, ReplaySummary, SinkAddresses,
};
use crate::slices::expand;

/// Everything a run needs besides the per-invocation addresses.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub catalog: CatalogSource,
    pub ledger_path: PathBuf,
    pub data_root: PathBuf,
    pub program: String,
}

/// Counters describing a finished run. Logged, never turned into an exit code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub instruments_listed: usize,
    pub instruments_in_scope: usize,
    pub instruments_with_gaps: usize,
    pub slices_submitted: usize,
    pub replay: ReplaySummary,
}

#[derive(Debug)]
pub struct RunCoordinator<R, I> {
    settings: CoordinatorSettings,
    reporter: R,
    invoker: I,
    client: reqwest::Client,
}

impl<R: GapReporter, I: Invoker> RunCoordinator<R, I> {
    pub fn new(
        settings: CoordinatorSettings,
        reporter: R,
        invoker: I,
        client: reqwest::Client,
    ) -> Self {
        Self {
            settings,
            reporter,
            invoker,
            client,
        }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// One full pass over every cabled instrument on `server`.
    ///
    /// Fatal: ledger load, catalog load, instrument listing, ledger persist.
    /// Everything else is logged and skipped per unit.
    pub async fn run(&self, sinks: SinkAddresses, server: &str) -> Result<RunReport> {
        let mut ledger = IngestLedger::load(&self.settings.ledger_path)?;
        let catalog =
            DriverCatalog::load(&self.settings.catalog, &self.client).await?;

        let listed = self.reporter.instruments(server).await.map_err(|source| {
            GapfillError::Inventory {
                server: server.to_string(),
                source,
            }
        })?;

        let mut report = RunReport {
            instruments_listed: listed.len(),
            ..RunReport::default()
        };

        let resolver = GapResolver::new(&self.reporter);
        let mut pending: Vec<(InstrumentRef, Vec<GapInterval>)> = Vec::new();
        for raw in &listed {
            let instrument = match InstrumentRef::parse(raw) {
                Ok(instrument) => instrument,
                Err(err) => {
                    debug!(designator = %raw, error = %err, "ignoring unparseable designator");
                    continue;
                }
            };
            if !catalog.is_known(&instrument) {
                continue;
            }
            report.instruments_in_scope += 1;
            let gaps = resolver.resolve(&instrument, server).await;
            if !gaps.is_empty() {
                pending.push((instrument, gaps));
            }
        }
        report.instruments_with_gaps = pending.len();

        let replay_settings = ReplaySettings {
            data_root: self.settings.data_root.clone(),
            program: self.settings.program.clone(),
            sinks,
        };
        let executor = ReplayExecutor::new(&catalog, &self.invoker, &replay_settings);

        for (instrument, gaps) in &pending {
            let slices = gate(&mut ledger, instrument, gaps);
            if slices.is_empty() {
                debug!(%instrument, "all gap slices already attempted");
                continue;
            }
            report.slices_submitted += slices.len();
            info!(%instrument, slices = slices.len(), "replaying missing slices");
            let summary = executor.run(instrument, &slices).await;
            report.replay.absorb(summary);

            // Attempts are durable once their instrument is done.
            ledger.persist()?;
        }

        if ledger.is_dirty() {
            ledger.persist()?;
        }

        info!(
            listed = report.instruments_listed,
            in_scope = report.instruments_in_scope,
            with_gaps = report.instruments_with_gaps,
            slices = report.slices_submitted,
            invocations = report.replay.invocations,
            timeouts = report.replay.timeouts,
            failures = report.replay.failures,
            no_data = report.replay.skipped_no_data,
            "gap replay run finished"
        );
        if report.replay.timeouts > 0 {
            warn!(
                timeouts = report.replay.timeouts,
                "some playbacks timed out and will not be retried"
            );
        }
        Ok(report)
    }
}

/// Expand each gap and keep the slices the ledger has not seen, oldest first.
/// Every kept slice is recorded as attempted.
pub fn gate(
    ledger: &mut IngestLedger,
    instrument: &InstrumentRef,
    gaps: &[GapInterval],
) -> Vec<TimeSlice> {
    let mut slices: Vec<TimeSlice> = gaps
        .iter()
        .flat_map(expand)
        .filter(|slice| ledger.should_attempt(instrument, *slice))
        .collect();
    // The ledger already dropped repeats; reporters may list gaps in any order.
    slices.sort_unstable();
    slices
}
