use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use gapfill_core::replay::{DEFAULT_PLAYER, DEFAULT_REPLAY_TIMEOUT};
use gapfill_core::{CatalogSource, CoordinatorSettings, TimeoutPolicy};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATALOG_URL: &str = "https://raw.githubusercontent.com/ooi-integration/ingestion-csvs/master/cabled_drivers_list.txt";
pub const DEFAULT_DATA_ROOT: &str = "/rsn_cabled/rsn_data/DVT_Data";
pub const DEFAULT_LEDGER_PATH: &str = "previous_ingests.json";
pub const DEFAULT_INVENTORY_URL: &str = "http://{server}:12590/gaps/instruments";
pub const DEFAULT_MISSING_URL: &str = "http://{server}:12590/gaps/missing/{refdes}";

/// Top-level settings of a replay run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GapfillConfig {
    pub catalog: CatalogConfig,
    pub gaps: GapReporterConfig,
    pub replay: ReplayConfig,
    pub ledger: LedgerConfig,
}

/// Where the cabled drivers table is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// `http(s)://` URL, `file://` URL, or a local path.
    pub url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
        }
    }
}

/// Endpoints of the gap report service. `{server}` is replaced with the
/// server argument, `{refdes}` with the reference designator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GapReporterConfig {
    pub inventory_url: String,
    pub missing_url: String,
}

impl Default for GapReporterConfig {
    fn default() -> Self {
        Self {
            inventory_url: DEFAULT_INVENTORY_URL.to_string(),
            missing_url: DEFAULT_MISSING_URL.to_string(),
        }
    }
}

/// Player invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Root of the raw data tree; node directories live directly below it.
    pub data_root: PathBuf,
    /// Player executable, resolved through `PATH` when not absolute.
    pub program: String,
    /// Wall-clock budget per invocation. Overrunning players are abandoned
    /// and their slice is not retried.
    pub timeout_secs: u64,
    /// Kill players that overrun the budget instead of leaving them running.
    pub kill_on_timeout: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            program: DEFAULT_PLAYER.to_string(),
            timeout_secs: DEFAULT_REPLAY_TIMEOUT.as_secs(),
            kill_on_timeout: true,
        }
    }
}

impl ReplayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        if self.kill_on_timeout {
            TimeoutPolicy::Kill
        } else {
            TimeoutPolicy::Detach
        }
    }
}

/// Location of the attempted-slices ledger. Read at start, written as the
/// run progresses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LEDGER_PATH),
        }
    }
}

impl GapfillConfig {
    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.replay.timeout_secs == 0 {
            bail!("replay.timeout_secs must be greater than zero");
        }
        if self.replay.program.trim().is_empty() {
            bail!("replay.program must not be empty");
        }
        if self.ledger.path.as_os_str().is_empty() {
            bail!("ledger.path must not be empty");
        }
        if !self.gaps.missing_url.contains(gapfill_core::gaps::REFDES_PLACEHOLDER) {
            bail!(
                "gaps.missing_url must contain {}",
                gapfill_core::gaps::REFDES_PLACEHOLDER
            );
        }
        CatalogSource::from_location(&self.catalog.url)
            .context("invalid catalog.url")?;
        Ok(())
    }

    /// Core settings for the run coordinator.
    pub fn coordinator_settings(&self) -> anyhow::Result<CoordinatorSettings> {
        Ok(CoordinatorSettings {
            catalog: CatalogSource::from_location(&self.catalog.url)
                .context("invalid catalog.url")?,
            ledger_path: self.ledger.path.clone(),
            data_root: self.replay.data_root.clone(),
            program: self.replay.program.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GapfillConfig::default();
        config.validate().unwrap();
        assert_eq!(config.replay.timeout(), Duration::from_secs(90));
        assert_eq!(config.replay.timeout_policy(), TimeoutPolicy::Kill);
        assert_eq!(config.replay.program, "playback");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = GapfillConfig::default();
        config.replay.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_url_needs_refdes_placeholder() {
        let mut config = GapfillConfig::default();
        config.gaps.missing_url = "http://{server}/missing".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn coordinator_settings_follow_config() {
        let mut config = GapfillConfig::default();
        config.catalog.url = "/srv/gapfill/drivers.txt".into();
        config.ledger.path = PathBuf::from("/var/lib/gapfill/ledger.json");
        let settings = config.coordinator_settings().unwrap();
        assert_eq!(
            settings.catalog,
            CatalogSource::Local(PathBuf::from("/srv/gapfill/drivers.txt"))
        );
        assert_eq!(settings.ledger_path, config.ledger.path);
        assert_eq!(settings.program, "playback");
    }
}
