use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};

/// Reference designator of a cabled instrument, e.g. `RS01SLBS-LJ01A-05-HYDLFA101`.
///
/// The designator is `site-node-port-instrument`; the node and instrument
/// segments address the raw data directories on disk. Anything after the
/// fourth segment is kept in the string but not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct InstrumentRef(String);

impl InstrumentRef {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let segments: Vec<&str> = trimmed.split('-').collect();
        if segments.len() < 4 {
            return Err(ModelError::InvalidInstrumentRef {
                input: input.to_string(),
                reason: "expected at least four '-' separated segments",
            });
        }
        if segments[..4].iter().any(|segment| segment.is_empty()) {
            return Err(ModelError::InvalidInstrumentRef {
                input: input.to_string(),
                reason: "empty segment",
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ModelError::InvalidInstrumentRef {
                input: input.to_string(),
                reason: "whitespace inside designator",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segment(&self, index: usize) -> &str {
        // Validated in `parse`, so the first four segments always exist.
        self.0.split('-').nth(index).unwrap_or_default()
    }

    pub fn site(&self) -> &str {
        self.segment(0)
    }

    /// Node segment, lower-cased as it appears in the data directory tree.
    pub fn node(&self) -> String {
        self.segment(1).to_ascii_lowercase()
    }

    pub fn port(&self) -> &str {
        self.segment(2)
    }

    /// Instrument segment, verbatim. Data directories are prefixed with it.
    pub fn instrument_class(&self) -> &str {
        self.segment(3)
    }
}

impl fmt::Display for InstrumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstrumentRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for InstrumentRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InstrumentRef {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<InstrumentRef> for String {
    fn from(value: InstrumentRef) -> Self {
        value.0
    }
}
