//! Configuration for the gapfill replay tool.
//!
//! Settings come from, in order of precedence: individual `GAPFILL_*`
//! environment overrides, then one of a config file named by
//! `$GAPFILL_CONFIG_PATH`, inline JSON in `$GAPFILL_CONFIG_JSON`, or a
//! well-known file in the working directory, then built-in defaults.

pub mod loader;
pub mod models;
pub mod util;

pub use loader::{ConfigLoad, ConfigLoader, ConfigSource};
pub use models::{
    CatalogConfig, GapReporterConfig, GapfillConfig, LedgerConfig, ReplayConfig,
};
