use crate::instrument::InstrumentRef;
use crate::slice::TimeSlice;

/// A single resolved playback invocation: one reader type over one hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayTask {
    pub instrument: InstrumentRef,
    pub driver: String,
    pub reader_type: String,
    pub slice: TimeSlice,
    /// Glob handed to the player, e.g. `/data/lj01a/HYDLFA101*20200101T00*`.
    pub data_pattern: String,
}
