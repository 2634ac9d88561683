//! Bounded execution of player invocations.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use super::command::PlaybackCommand;

/// Default wall-clock budget for one player invocation.
pub const DEFAULT_REPLAY_TIMEOUT: Duration = Duration::from_secs(90);

/// What happens to a player process that overruns its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Kill and reap the child.
    #[default]
    Kill,
    /// Stop waiting and leave the child running.
    Detach,
}

/// Result of one invocation. None of these abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// The process exited within budget. The status is informational only;
    /// a non-zero exit is not treated as a failure.
    Completed { status: ExitStatus },
    TimedOut,
    /// The process could not be started or waited on.
    Failed { error: String },
}

/// Runs one player invocation to completion or timeout.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, command: &PlaybackCommand) -> InvocationOutcome;

    /// Budget reported in timeout warnings.
    fn timeout(&self) -> Duration;
}

/// Spawns the player as a child process.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    timeout: Duration,
    policy: TimeoutPolicy,
}

impl Default for ProcessInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_TIMEOUT, TimeoutPolicy::default())
    }
}

impl ProcessInvoker {
    pub fn new(timeout: Duration, policy: TimeoutPolicy) -> Self {
        Self { timeout, policy }
    }
}

#[async_trait]
impl Invoker for ProcessInvoker {
    async fn invoke(&self, command: &PlaybackCommand) -> InvocationOutcome {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .stdin(Stdio::null())
            .kill_on_drop(self.policy == TimeoutPolicy::Kill);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return InvocationOutcome::Failed {
                    error: format!("failed to spawn {}: {err}", command.program()),
                };
            }
        };

        match timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => InvocationOutcome::Completed { status },
            Ok(Err(err)) => InvocationOutcome::Failed {
                error: format!("failed to wait on {}: {err}", command.program()),
            },
            Err(_) => {
                match self.policy {
                    TimeoutPolicy::Kill => {
                        if let Err(err) = child.kill().await {
                            warn!(pid = ?child.id(), error = %err, "failed to kill timed out player");
                        }
                    }
                    TimeoutPolicy::Detach => drop(child),
                }
                InvocationOutcome::TimedOut
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
