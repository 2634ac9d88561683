//! # gapfill-core
//!
//! Finds holes in ingested instrument telemetry and replays them through the
//! external `playback` player, never submitting the same instrument hour twice.
//!
//! - [`catalog`]: cabled drivers table, loaded once per run
//! - [`gaps`]: the gap reporter seam and interval normalisation
//! - [`slices`]: hourly expansion of gap intervals
//! - [`ledger`]: durable record of attempted slices
//! - [`replay`]: data glob resolution and timeout-bounded player runs
//! - [`coordinator`]: a full run tying the above together

#![allow(missing_docs)]

pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod gaps;
pub mod ledger;
pub mod replay;
pub mod slices;

pub use catalog::{CatalogSource, DriverCatalog};
pub use coordinator::{CoordinatorSettings, RunCoordinator, RunReport};
pub use error::{CatalogError, GapReportError, GapfillError, LedgerError, Result};
pub use gaps::{GapReporter, GapResolver, HttpGapReporter, RawGap};
pub use ledger::IngestLedger;
pub use replay::{
    InvocationOutcome, Invoker, PlaybackCommand, ProcessInvoker, ReplayExecutor,
    ReplaySettings, ReplaySummary, SinkAddresses, TimeoutPolicy,
};

pub use gapfill_model as model;
