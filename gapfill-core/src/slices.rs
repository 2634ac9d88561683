//! Expansion of gap intervals into hourly replay slices.

use gapfill_model::{GapInterval, TimeSlice};

/// Hourly slices covering `gap`, inclusive of both ends.
///
/// Starts at the hour containing `start` and steps one hour at a time until
/// the running timestamp reaches `end`; the slice at or after `end` is
/// included. Never empty.
pub fn expand(gap: &GapInterval) -> Vec<TimeSlice> {
    let mut current = TimeSlice::containing(gap.start());
    let mut slices = vec![current];
    while current.start() < gap.end() {
        current = current.next();
        slices.push(current);
    }
    slices
}

/// Expansions of every gap, concatenated in order. Overlaps are kept.
pub fn expand_all(gaps: &[GapInterval]) -> Vec<TimeSlice> {
    gaps.iter().flat_map(expand).collect()
}
