use std::path::PathBuf;

use thiserror::Error;

/// Failures while obtaining or parsing the driver catalog. Always fatal.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("unsupported catalog location {0:?}")]
    UnsupportedLocation(String),

    #[error("failed to fetch catalog from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalog request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog header is missing column {0:?}")]
    MissingColumn(&'static str),

    #[error("catalog contains no instrument rows")]
    Empty,
}

/// Failures of the ingest ledger's backing store.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ledger {path} has unsupported version {version}")]
    UnsupportedVersion { path: PathBuf, version: u32 },

    #[error("failed to encode ledger: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failures talking to the gap reporter.
#[derive(Error, Debug)]
pub enum GapReportError {
    #[error("gap reporter request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("gap reporter request to {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("gap reporter response from {url} is not understood: {reason}")]
    Decode { url: String, reason: String },
}

/// Run-level failures. Anything here aborts the run.
#[derive(Error, Debug)]
pub enum GapfillError {
    #[error("driver catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("failed to list instruments on {server}: {source}")]
    Inventory {
        server: String,
        #[source]
        source: GapReportError,
    },
}

pub type Result<T> = std::result::Result<T, GapfillError>;
