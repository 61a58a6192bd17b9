//! Backend configuration
//!
//! Defaults that used to be compile-time constants (control tool path,
//! fallback cluster address) are carried here so callers and tests can
//! substitute their own.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default control tool binary
pub const DEFAULT_TOOL: &str = "collie";

/// Default cluster address used when a pool names no host
pub const DEFAULT_ADDRESS: &str = "localhost";

/// Default sheep daemon port
pub const DEFAULT_PORT: u16 = 7000;

/// Configuration for the Sheepdog backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheepdogConfig {
    /// Control tool binary, resolved through `PATH` when relative
    pub tool_path: PathBuf,
    /// Address used when the pool's host entry has no name
    pub default_address: String,
    /// Port used when the pool's host entry has no port
    pub default_port: u16,
}

impl Default for SheepdogConfig {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from(DEFAULT_TOOL),
            default_address: DEFAULT_ADDRESS.to_string(),
            default_port: DEFAULT_PORT,
        }
    }
}

impl SheepdogConfig {
    /// Load a configuration from a JSON document; missing keys keep defaults
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Reject values that can never produce a runnable command
    pub fn validate(&self) -> Result<()> {
        if self.tool_path.as_os_str().is_empty() {
            return Err(Error::Configuration("tool_path must not be empty".into()));
        }
        if self.default_address.trim().is_empty() {
            return Err(Error::Configuration(
                "default_address must not be empty".into(),
            ));
        }
        if self.default_port == 0 {
            return Err(Error::Configuration("default_port must be non-zero".into()));
        }
        Ok(())
    }
}
