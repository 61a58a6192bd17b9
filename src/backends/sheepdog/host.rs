//! Cluster address selection

use crate::config::SheepdogConfig;
use crate::domain::model::PoolHost;
use serde::{Deserialize, Serialize};

/// Address/port pair passed to the control tool as `-a` / `-p`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTarget {
    pub address: String,
    pub port: u16,
}

impl HostTarget {
    /// Pick the target for a pool.
    ///
    /// Only the first host entry is read. A missing name or a missing/zero
    /// port falls back to the configured default for that half.
    pub fn resolve(hosts: &[PoolHost], config: &SheepdogConfig) -> Self {
        let first = hosts.first();

        let address = first
            .and_then(|h| h.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(config.default_address.as_str())
            .to_string();

        let port = first
            .and_then(|h| h.port)
            .filter(|&port| port != 0)
            .unwrap_or(config.default_port);

        Self { address, port }
    }

    /// Host flags appended to every control tool invocation
    pub fn args(&self) -> [String; 4] {
        [
            "-a".to_string(),
            self.address.clone(),
            "-p".to_string(),
            self.port.to_string(),
        ]
    }
}

impl std::fmt::Display for HostTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
