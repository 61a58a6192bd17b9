//! Error types for the Sheepdog pool backend
//!
//! Every failure of a backend operation is surfaced to the caller through
//! [`Error`]. [`Error::kind`] folds the variants onto the four failure kinds
//! a pool manager needs to distinguish.

use thiserror::Error;

/// Unified error type for the backend
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Request Validation Errors
    // =========================================================================
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("Invalid option for {operation}: unsupported flags {flags:#x}")]
    InvalidOption { operation: String, flags: u32 },

    #[error("Unsupported pool type: {pool_type}")]
    UnsupportedPoolType { pool_type: String },

    // =========================================================================
    // Execution Errors
    // =========================================================================
    #[error("Failed to run {command}: {reason}")]
    Execution { command: String, reason: String },

    #[error("Command {command} exited with {status}: {diagnostic}")]
    CommandFailed {
        command: String,
        status: String,
        diagnostic: String,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("Malformed {report} report at line {line}: {reason}")]
    Parse {
        report: &'static str,
        line: usize,
        reason: String,
    },

    #[error("Capacity parse error: {0}")]
    CapacityParse(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Failure classes reported to the pool manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request asks for a feature this backend cannot provide
    UnsupportedConfiguration,
    /// Flags or options were passed to an operation that takes none
    InvalidOption,
    /// The control tool could not be started or exited unsuccessfully
    ExecutionFailure,
    /// The control tool's report did not match the expected grammar
    ParseFailure,
    /// Problems outside the five backend operations (config files, IO)
    Internal,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedConfiguration(_) | Error::UnsupportedPoolType { .. } => {
                ErrorKind::UnsupportedConfiguration
            }
            Error::InvalidOption { .. } => ErrorKind::InvalidOption,
            Error::Execution { .. } | Error::CommandFailed { .. } => ErrorKind::ExecutionFailure,
            Error::Parse { .. } | Error::CapacityParse(_) => ErrorKind::ParseFailure,
            Error::Configuration(_) | Error::JsonParse(_) => ErrorKind::Internal,
        }
    }

    /// Check if repeating the same call could succeed.
    ///
    /// The backend never retries by itself; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::ExecutionFailure)
    }

    pub(crate) fn parse(report: &'static str, line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            report,
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for the backend
pub type Result<T> = std::result::Result<T, Error>;
