//! Process runner backed by `tokio::process`

use crate::domain::ports::{CommandLine, CommandOutput, ProcessRunner};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs commands as child processes, capturing stdout and stderr.
///
/// No timeout is applied; a hung control tool blocks the calling task
/// until the caller gives up on it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
        debug!("Running {}", command);

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Execution {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        // stdout is decoded by the report parsers
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
