use std::fmt;

use gapfill_model::ReplayTask;

/// Where the player publishes what it ingests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkAddresses {
    pub event_url: String,
    pub particle_url: String,
}

/// A player invocation as an argument vector; never passed through a shell.
///
/// Positional order: reader type, driver, designator, event sink, particle
/// sink, data glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackCommand {
    program: String,
    args: Vec<String>,
}

impl PlaybackCommand {
    pub fn for_task(program: &str, task: &ReplayTask, sinks: &SinkAddresses) -> Self {
        Self {
            program: program.to_string(),
            args: vec![
                task.reader_type.clone(),
                task.driver.clone(),
                task.instrument.to_string(),
                sinks.event_url.clone(),
                sinks.particle_url.clone(),
                task.data_pattern.clone(),
            ],
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for PlaybackCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
