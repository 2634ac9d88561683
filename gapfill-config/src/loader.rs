//! Layered config loading.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::debug;

use crate::models::GapfillConfig;
use crate::util::{non_blank, parse_bool};

pub const CONFIG_PATH_VAR: &str = "GAPFILL_CONFIG_PATH";
pub const CONFIG_JSON_VAR: &str = "GAPFILL_CONFIG_JSON";
pub const CATALOG_URL_VAR: &str = "GAPFILL_CATALOG_URL";
pub const DATA_ROOT_VAR: &str = "GAPFILL_DATA_ROOT";
pub const PLAYER_VAR: &str = "GAPFILL_PLAYER";
pub const REPLAY_TIMEOUT_VAR: &str = "GAPFILL_REPLAY_TIMEOUT";
pub const KILL_ON_TIMEOUT_VAR: &str = "GAPFILL_KILL_ON_TIMEOUT";
pub const LEDGER_PATH_VAR: &str = "GAPFILL_LEDGER_PATH";

const DEFAULT_FILES: &[&str] = &[
    "gapfill.toml",
    "gapfill.json",
    "config/gapfill.toml",
    "config/gapfill.json",
];

/// Source that produced the base configuration (before env overrides).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("defaults"),
            Self::EnvPath(path) => write!(f, "${CONFIG_PATH_VAR} ({})", path.display()),
            Self::EnvInline => write!(f, "${CONFIG_JSON_VAR}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A validated configuration and where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: GapfillConfig,
    pub source: ConfigSource,
    /// Names of the `GAPFILL_*` variables that overrode file values.
    pub overrides: Vec<&'static str>,
}

type Lookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

/// Builds a [`GapfillConfig`] from files and environment variables.
pub struct ConfigLoader<'a> {
    lookup: Lookup<'a>,
    base_dir: PathBuf,
}

impl fmt::Debug for ConfigLoader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("base_dir", &self.base_dir)
            .finish_non_exhaustive()
    }
}

impl Default for ConfigLoader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader<'static> {
    /// Loader reading the process environment and the working directory.
    pub fn new() -> Self {
        Self {
            lookup: Box::new(|name| std::env::var(name).ok()),
            base_dir: PathBuf::from("."),
        }
    }
}

impl<'a> ConfigLoader<'a> {
    /// Loader with an injected variable lookup, used by tests and embedders.
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
            base_dir: PathBuf::from("."),
        }
    }

    /// Directory searched for the well-known config file names.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    fn var(&self, name: &str) -> Option<String> {
        non_blank((self.lookup)(name))
    }

    pub fn load(&self) -> anyhow::Result<ConfigLoad> {
        let (mut config, source) = self.load_base()?;
        let overrides = self.apply_overrides(&mut config)?;
        config.validate().with_context(|| {
            format!("invalid configuration from {source}")
        })?;
        debug!(%source, ?overrides, "configuration loaded");
        Ok(ConfigLoad {
            config,
            source,
            overrides,
        })
    }

    fn load_base(&self) -> anyhow::Result<(GapfillConfig, ConfigSource)> {
        if let Some(path) = self.var(CONFIG_PATH_VAR) {
            let path = PathBuf::from(path);
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = self.var(CONFIG_JSON_VAR) {
            let config = parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_VAR}"))?;
            return Ok((config, ConfigSource::EnvInline));
        }

        if let Some(path) = DEFAULT_FILES
            .iter()
            .map(|name| self.base_dir.join(name))
            .find(|path| path.exists())
        {
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((GapfillConfig::default(), ConfigSource::Default))
    }

    fn apply_overrides(
        &self,
        config: &mut GapfillConfig,
    ) -> anyhow::Result<Vec<&'static str>> {
        let mut applied = Vec::new();

        if let Some(url) = self.var(CATALOG_URL_VAR) {
            config.catalog.url = url;
            applied.push(CATALOG_URL_VAR);
        }
        if let Some(root) = self.var(DATA_ROOT_VAR) {
            config.replay.data_root = PathBuf::from(root);
            applied.push(DATA_ROOT_VAR);
        }
        if let Some(program) = self.var(PLAYER_VAR) {
            config.replay.program = program;
            applied.push(PLAYER_VAR);
        }
        if let Some(raw) = self.var(REPLAY_TIMEOUT_VAR) {
            let timeout = humantime::parse_duration(raw.trim()).with_context(
                || format!("{REPLAY_TIMEOUT_VAR}={raw:?} is not a duration"),
            )?;
            config.replay.timeout_secs = timeout.as_secs();
            applied.push(REPLAY_TIMEOUT_VAR);
        }
        if let Some(raw) = self.var(KILL_ON_TIMEOUT_VAR) {
            config.replay.kill_on_timeout = parse_bool(&raw).ok_or_else(|| {
                anyhow!("{KILL_ON_TIMEOUT_VAR}={raw:?} is not a boolean")
            })?;
            applied.push(KILL_ON_TIMEOUT_VAR);
        }
        if let Some(path) = self.var(LEDGER_PATH_VAR) {
            config.ledger.path = PathBuf::from(path);
            applied.push(LEDGER_PATH_VAR);
        }

        Ok(applied)
    }
}

pub fn load_from_file(path: &Path) -> anyhow::Result<GapfillConfig> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!("failed to read config from {}", path.display())
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&contents)
            .with_context(|| format!("invalid config {}", path.display())),
        Some("toml") => toml::from_str(&contents).map_err(|err| {
            anyhow!("invalid config {}: {}", path.display(), err)
        }),
        _ => parse_from_str(&contents, &path.display().to_string()),
    }
}

/// Try TOML first, then JSON.
pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<GapfillConfig> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!(
                "failed to parse config {}: toml error: {}; json error: {}",
                origin,
                toml_err,
                json_err
            )
        })
    })
}

pub fn parse_json(raw: &str) -> anyhow::Result<GapfillConfig> {
    serde_json::from_str(raw).map_err(|err| anyhow!("invalid config json: {err}"))
}
