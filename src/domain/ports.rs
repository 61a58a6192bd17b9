//! Domain Ports - Core trait definitions for pool backends
//!
//! [`StorageBackend`] is the contract a pool manager dispatches to;
//! [`ProcessRunner`] is the seam between a backend and the operating
//! system, so backends can be driven by scripted fakes in tests.

use crate::domain::model::{OperationFlags, Pool, PoolType, Volume};
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// External Commands
// =============================================================================

/// A fully composed external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program to execute
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<String>,
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// What a finished process left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
    /// Captured standard output, undecoded
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run printing `stdout`
    pub fn success(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A run that exited with `code` and printed `stderr`
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(0)
    }

    /// Best available diagnostic text for a failed run
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = String::from_utf8_lossy(&self.stdout);
        if !stdout.trim().is_empty() {
            return stdout.trim().to_string();
        }
        "no output".to_string()
    }

    /// Human-readable exit status
    pub fn status_description(&self) -> String {
        match self.status {
            Some(code) => format!("exit status {}", code),
            None => "termination by signal".to_string(),
        }
    }
}

/// Port for running external commands
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command` to completion and capture its output.
    ///
    /// A process that starts and exits non-zero is NOT an error here; only
    /// failing to start it (or to collect its output) is.
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput>;
}

// =============================================================================
// Storage Backend Port
// =============================================================================

/// Port for pool/volume operations of one pool type.
///
/// Callers must not run two operations against the same pool at once;
/// the `&mut` receivers below make that explicit.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Pool type served by this backend
    fn pool_type(&self) -> PoolType;

    /// Reload capacity, allocation and the full volume list of `pool`.
    ///
    /// On failure `pool` is left exactly as it was.
    async fn refresh_pool(&self, pool: &mut Pool) -> Result<()>;

    /// Create `volume` in `pool`, then populate it from the cluster
    async fn create_volume(&self, pool: &Pool, volume: &mut Volume) -> Result<()>;

    /// Reload the capacity and allocation of a single volume
    async fn refresh_volume(&self, pool: &Pool, volume: &mut Volume) -> Result<()>;

    /// Delete a volume
    async fn delete_volume(&self, pool: &Pool, volume: &Volume, flags: OperationFlags)
        -> Result<()>;

    /// Resize a volume to `capacity` bytes
    async fn resize_volume(
        &self,
        pool: &Pool,
        volume: &Volume,
        capacity: u64,
        flags: OperationFlags,
    ) -> Result<()>;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type StorageBackendRef = Arc<dyn StorageBackend>;
pub type ProcessRunnerRef = Arc<dyn ProcessRunner>;
