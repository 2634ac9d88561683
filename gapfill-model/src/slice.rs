use std::fmt;

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::error::{ModelError, Result};

/// `strftime` pattern of a slice label, e.g. `20200101T05`.
pub const SLICE_LABEL_FORMAT: &str = "%Y%m%dT%H";

/// One hour of instrument data, the unit of replay.
///
/// Always truncated to the top of the hour; two slices compare equal exactly
/// when their labels do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlice(NaiveDateTime);

impl TimeSlice {
    /// Slice containing `at`.
    pub fn containing(at: NaiveDateTime) -> Self {
        let hour = at
            .with_nanosecond(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_minute(0))
            .unwrap_or(at);
        Self(hour)
    }

    /// Parse a `YYYYMMDDTHH` label.
    pub fn parse_label(label: &str) -> Result<Self> {
        // chrono refuses to build a datetime without minutes, so pad them.
        let padded = format!("{label}00");
        NaiveDateTime::parse_from_str(&padded, "%Y%m%dT%H%M")
            .map(Self)
            .map_err(|_| ModelError::InvalidSliceLabel(label.to_string()))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + Duration::hours(1))
    }

    pub fn label(&self) -> String {
        self.0.format(SLICE_LABEL_FORMAT).to_string()
    }
}

impl fmt::Display for TimeSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SLICE_LABEL_FORMAT))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimeSlice {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeSlice {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_label(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn truncates_to_hour() {
        let slice = TimeSlice::containing(at(7, 59, 59));
        assert_eq!(slice.start(), at(7, 0, 0));
        assert_eq!(slice.label(), "20200101T07");
    }

    #[test]
    fn label_parses_back() {
        let slice = TimeSlice::parse_label("20191231T23").unwrap();
        assert_eq!(slice.next().label(), "20200101T00");
        assert!(TimeSlice::parse_label("2019-12-31").is_err());
        assert!(TimeSlice::parse_label("20191231T25").is_err());
    }

    #[test]
    fn orders_chronologically() {
        let a = TimeSlice::containing(at(1, 0, 0));
        let b = TimeSlice::containing(at(2, 30, 0));
        assert!(a < b);
        assert_eq!(a.next(), TimeSlice::containing(at(2, 0, 0)));
    }
}
