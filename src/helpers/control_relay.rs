use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, error, info};
use thiserror::Error;
use tokio::process::Command;

use crate::data::ControlCommand;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Failed to execute command: {command}: {stderr}")]
    CommandExecutionFailed { command: String, stderr: String },

    #[error("Command {command} did not finish within {timeout_secs} seconds")]
    CommandTimedOut { command: String, timeout_secs: u64 },
}

/// Something that can carry out a playback command and report back as text
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn send(&self, command: ControlCommand) -> Result<String, RelayError>;
}

/// Runs the external control executable with the command name as its only argument.
///
/// Each run is bounded by a timeout. The child is killed when the run is
/// abandoned, whether by timeout or because the calling request went away.
#[derive(Debug, Clone)]
pub struct ExecutableRelay {
    executable: PathBuf,
    timeout: Duration,
}

impl ExecutableRelay {
    pub fn new<P: Into<PathBuf>>(executable: P, timeout: Duration) -> Self {
        ExecutableRelay {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[async_trait]
impl CommandRunner for ExecutableRelay {
    async fn send(&self, command: ControlCommand) -> Result<String, RelayError> {
        debug!("Running {} {}", self.executable.display(), command);

        let mut cmd = Command::new(&self.executable);
        cmd.arg(command.as_ref())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let child = cmd.spawn().map_err(|e| {
            error!("Error starting {}: {}", self.executable.display(), e);
            RelayError::CommandExecutionFailed {
                command: command.to_string(),
                stderr: e.to_string(),
            }
        })?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!("Error waiting for command {}: {}", command, e);
                return Err(RelayError::CommandExecutionFailed {
                    command: command.to_string(),
                    stderr: e.to_string(),
                });
            }
            Err(_) => {
                error!("Command {} timed out after {:?}", command, self.timeout);
                return Err(RelayError::CommandTimedOut {
                    command: command.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Error executing command {}: {} ({})", command, stderr, output.status);
            return Err(RelayError::CommandExecutionFailed {
                command: command.to_string(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("Executable output for {}: {}", command, stdout);
        Ok(stdout)
    }
}
