//! Core data model definitions shared across gapfill crates.
#![allow(missing_docs)]

pub mod driver;
pub mod error;
pub mod instrument;
pub mod interval;
pub mod slice;
pub mod task;

pub use driver::DriverEntry;
pub use error::{ModelError, Result as ModelResult};
pub use instrument::InstrumentRef;
pub use interval::{GAP_TIMESTAMP_FORMAT, GapInterval};
pub use slice::{SLICE_LABEL_FORMAT, TimeSlice};
pub use task::ReplayTask;
