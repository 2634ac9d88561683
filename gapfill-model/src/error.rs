use thiserror::Error;

/// Errors produced by model constructors and parsers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid reference designator {input:?}: {reason}")]
    InvalidInstrumentRef { input: String, reason: &'static str },

    #[error("invalid timestamp {input:?}: expected {expected}")]
    InvalidTimestamp {
        input: String,
        expected: &'static str,
    },

    #[error("invalid time slice label {0:?}")]
    InvalidSliceLabel(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
