use chrono::NaiveDateTime;

use crate::error::{ModelError, Result};

/// Timestamp format used by the gap reporter, e.g. `2020-01-01 00:00:00`.
pub const GAP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A missing stretch of data for one instrument. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl GapInterval {
    /// Build an interval from two endpoints given in either order.
    pub fn new(a: NaiveDateTime, b: NaiveDateTime) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    /// Parse a reporter pair of `YYYY-MM-DD HH:MM:SS` strings.
    pub fn parse(first: &str, second: &str) -> Result<Self> {
        Ok(Self::new(parse_timestamp(first)?, parse_timestamp(second)?))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), GAP_TIMESTAMP_FORMAT).map_err(
        |_| ModelError::InvalidTimestamp {
            input: raw.to_string(),
            expected: GAP_TIMESTAMP_FORMAT,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_reversed_endpoints() {
        let gap =
            GapInterval::parse("2020-01-02 00:00:00", "2020-01-01 12:00:00")
                .unwrap();
        assert!(gap.start() < gap.end());
        assert_eq!(gap.start().to_string(), "2020-01-01 12:00:00");
    }

    #[test]
    fn rejects_other_formats() {
        let err = GapInterval::parse("2020-01-01T00:00:00Z", "2020-01-01 01:00:00")
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidTimestamp { .. }));
    }
}
