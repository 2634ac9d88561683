//! Shared fixtures for coordinator tests: an in-memory gap reporter, a
//! recording invoker, and a throwaway data tree.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use gapfill_core::model::InstrumentRef;
use gapfill_core::{
    CatalogSource, CoordinatorSettings, GapReportError, GapReporter,
    InvocationOutcome, Invoker, PlaybackCommand, RawGap,
};
use tempfile::TempDir;

pub const HYDROPHONE: &str = "RS01SLBS-LJ01A-05-HYDLFA101";
pub const HYDROPHONE_SHORT: &str = "RS01SLBS-LJ01A-05-HYDLFA";
pub const CTD: &str = "RS03AXPS-PC03A-4A-CTDPFA303";
pub const UNCABLED: &str = "CE02SHBP-LJ01D-06-CTDBPN106";

pub const CATALOG: &str = "\
Reference Designator          Type                  Driver
RS01SLBS-LJ01A-05-HYDLFA101   hydlf_raw             mi.instrument.hydrophone.driver
RS01SLBS-LJ01A-05-HYDLFA101   hydlf_status          mi.instrument.hydrophone.driver
RS01SLBS-LJ01A-05-HYDLFA      hydlf_raw             mi.instrument.hydrophone.driver
RS03AXPS-PC03A-4A-CTDPFA303   None                  mi.instrument.seabird.ctdpf
";

#[derive(Debug, Default)]
pub struct StaticReporter {
    pub instruments: Vec<String>,
    pub gaps: HashMap<String, Vec<RawGap>>,
    pub failing: Vec<String>,
}

impl StaticReporter {
    pub fn with_gap(mut self, refdes: &str, start: &str, end: &str) -> Self {
        if !self.instruments.iter().any(|known| known == refdes) {
            self.instruments.push(refdes.to_string());
        }
        self.gaps
            .entry(refdes.to_string())
            .or_default()
            .push((start.to_string(), end.to_string()));
        self
    }

    pub fn listing(mut self, refdes: &str) -> Self {
        self.instruments.push(refdes.to_string());
        self
    }
}

#[async_trait]
impl GapReporter for StaticReporter {
    async fn instruments(
        &self,
        _server: &str,
    ) -> Result<Vec<String>, GapReportError> {
        Ok(self.instruments.clone())
    }

    async fn missing_ranges(
        &self,
        instrument: &InstrumentRef,
        _server: &str,
    ) -> Result<Vec<RawGap>, GapReportError> {
        if self.failing.iter().any(|r| r == instrument.as_str()) {
            return Err(GapReportError::Decode {
                url: format!("memory://{instrument}"),
                reason: "scripted failure".into(),
            });
        }
        Ok(self.gaps.get(instrument.as_str()).cloned().unwrap_or_default())
    }
}

/// Records every command; answers with scripted outcomes, `Completed` once
/// the script runs out.
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    pub calls: Mutex<Vec<PlaybackCommand>>,
    pub script: Mutex<Vec<InvocationOutcome>>,
}

impl RecordingInvoker {
    pub fn scripted(outcomes: Vec<InvocationOutcome>) -> Self {
        let mut script = outcomes;
        script.reverse();
        Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(script),
        }
    }

    pub fn calls(&self) -> Vec<PlaybackCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Invoker for RecordingInvoker {
    async fn invoke(&self, command: &PlaybackCommand) -> InvocationOutcome {
        self.calls.lock().unwrap().push(command.clone());
        self.script
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(completed)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(90)
    }
}

pub fn completed() -> InvocationOutcome {
    use std::os::unix::process::ExitStatusExt;
    InvocationOutcome::Completed {
        status: std::process::ExitStatus::from_raw(0),
    }
}

/// Temp workspace with a catalog file, data root and ledger location.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("drivers.txt"), CATALOG).unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        Self { dir }
    }

    pub fn data_root(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.dir.path().join("state").join("previous_ingests.json")
    }

    /// Create `{root}/{node}/{instrument}_{slice}00_UTC` for each label.
    pub fn add_data(&self, refdes: &str, labels: &[&str]) {
        let r = InstrumentRef::parse(refdes).unwrap();
        let node = self.data_root().join(r.node());
        for label in labels {
            let dir = node.join(format!("{}_{label}00_UTC", r.instrument_class()));
            std::fs::create_dir_all(dir).unwrap();
        }
    }

    pub fn settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            catalog: CatalogSource::Local(self.dir.path().join("drivers.txt")),
            ledger_path: self.ledger_path(),
            data_root: self.data_root(),
            program: "playback".into(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
