//! Pool and volume records populated by storage backends

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// Pool Types
// =============================================================================

/// Pool types a backend can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolType {
    Sheepdog,
}

impl std::fmt::Display for PoolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolType::Sheepdog => write!(f, "sheepdog"),
        }
    }
}

impl FromStr for PoolType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sheepdog" => Ok(PoolType::Sheepdog),
            _ => Err(Error::UnsupportedPoolType {
                pool_type: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Pool
// =============================================================================

/// A host entry from a pool's source definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolHost {
    /// Host name or address
    pub name: Option<String>,
    /// Port; `None` or `0` means unset
    pub port: Option<u16>,
}

impl PoolHost {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: Some(name.into()),
            port: Some(port),
        }
    }
}

/// A storage pool as seen by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Identifying name, also the prefix of every volume key
    pub name: String,
    /// Configured hosts; only the first entry is consulted
    #[serde(default)]
    pub hosts: Vec<PoolHost>,
    /// Total bytes reported by the cluster
    pub capacity: u64,
    /// Bytes in use
    pub allocation: u64,
    /// Current volumes in report order
    #[serde(default)]
    pub volumes: Vec<Volume>,
}

impl Pool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: PoolHost) -> Self {
        self.hosts.push(host);
        self
    }

    /// Free bytes, derived from capacity and allocation.
    ///
    /// Parsed pools always satisfy `capacity >= allocation`; hand-built
    /// records that don't report zero.
    pub fn available(&self) -> u64 {
        self.capacity.saturating_sub(self.allocation)
    }

    /// Look up a volume by its (raw) name
    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }
}

// =============================================================================
// Volume
// =============================================================================

/// How a volume is reached by consumers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeKind {
    #[default]
    Network,
}

impl std::fmt::Display for VolumeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeKind::Network => write!(f, "network"),
        }
    }
}

/// Encryption requested for a volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeEncryption {
    /// Encryption format, e.g. `luks`
    pub format: String,
}

/// A volume record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume name as reported by the cluster (escapes kept verbatim)
    pub name: String,
    pub kind: VolumeKind,
    /// Size in bytes
    pub capacity: u64,
    /// Bytes actually allocated
    pub allocation: u64,
    /// Display path, equal to the name
    pub target: String,
    /// `<pool>/<volume>` cross-reference key
    pub key: String,
    /// Requested encryption; only meaningful when creating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<VolumeEncryption>,
}

impl Volume {
    /// A volume definition ready to be created
    pub fn new(name: impl Into<String>, capacity: u64) -> Self {
        Self {
            name: name.into(),
            capacity,
            ..Default::default()
        }
    }

    /// Composite key used to cross-reference volumes between pools
    pub fn key_for(pool_name: &str, volume_name: &str) -> String {
        format!("{}/{}", pool_name, volume_name)
    }

    /// Fill in the fields derived from the owning pool and the name
    pub(crate) fn bind_to(&mut self, pool_name: &str) {
        self.kind = VolumeKind::Network;
        self.target = self.name.clone();
        self.key = Self::key_for(pool_name, &self.name);
    }
}

// =============================================================================
// Operation Flags
// =============================================================================

/// Caller-supplied option bits for volume operations.
///
/// No Sheepdog operation accepts any flag; anything other than
/// [`OperationFlags::NONE`] is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationFlags(pub u32);

impl OperationFlags {
    pub const NONE: OperationFlags = OperationFlags(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Fail with [`Error::InvalidOption`] unless every bit is clear
    pub fn ensure_none(self, operation: &str) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidOption {
                operation: operation.to_string(),
                flags: self.0,
            })
        }
    }
}

// =============================================================================
// Capacity Parsing
// =============================================================================

/// Parse a byte count with an optional binary unit suffix (`K`, `M`, `G`, `T`).
///
/// `"1048576"`, `"1M"`, `"1MiB"` and `"1MB"` all yield 1048576.
pub fn parse_capacity(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(digits_end);

    if digits.is_empty() {
        return Err(Error::CapacityParse(format!("no digits in {:?}", input)));
    }

    let value: u64 = digits
        .parse()
        .map_err(|e| Error::CapacityParse(format!("{:?}: {}", input, e)))?;

    let shift = match suffix.to_ascii_uppercase().as_str() {
        "" | "B" => 0,
        "K" | "KB" | "KIB" => 10,
        "M" | "MB" | "MIB" => 20,
        "G" | "GB" | "GIB" => 30,
        "T" | "TB" | "TIB" => 40,
        other => {
            return Err(Error::CapacityParse(format!(
                "unknown unit {:?} in {:?}",
                other, input
            )))
        }
    };

    value
        .checked_mul(1u64 << shift)
        .ok_or_else(|| Error::CapacityParse(format!("{:?} overflows u64", input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_pool_type_round_trip() {
        assert_eq!("sheepdog".parse::<PoolType>().unwrap(), PoolType::Sheepdog);
        assert_eq!("Sheepdog".parse::<PoolType>().unwrap(), PoolType::Sheepdog);
        assert_eq!(PoolType::Sheepdog.to_string(), "sheepdog");
        assert_matches!(
            "rbd".parse::<PoolType>(),
            Err(Error::UnsupportedPoolType { pool_type }) if pool_type == "rbd"
        );
    }

    #[test]
    fn test_pool_available_is_derived() {
        let mut pool = Pool::new("sheep");
        pool.capacity = 15245667872;
        pool.allocation = 117571104;
        assert_eq!(pool.available(), 15128096768);

        pool.allocation = pool.capacity;
        assert_eq!(pool.available(), 0);

        pool.allocation = pool.capacity + 1;
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_volume_binding() {
        let mut vol = Volume::new("test\\ name", 10);
        vol.bind_to("sheep");
        assert_eq!(vol.kind, VolumeKind::Network);
        assert_eq!(vol.target, "test\\ name");
        assert_eq!(vol.key, "sheep/test\\ name");
    }

    #[test]
    fn test_operation_flags() {
        assert!(OperationFlags::NONE.ensure_none("vdi delete").is_ok());
        assert_matches!(
            OperationFlags(2).ensure_none("vdi delete"),
            Err(Error::InvalidOption { flags: 2, .. })
        );
    }

    #[test]
    fn test_parse_capacity() {
        assert_eq!(parse_capacity("1048576").unwrap(), 1048576);
        assert_eq!(parse_capacity("1M").unwrap(), 1048576);
        assert_eq!(parse_capacity("1MiB").unwrap(), 1048576);
        assert_eq!(parse_capacity("10G").unwrap(), 10 * 1024 * 1024 * 1024);
        assert_eq!(parse_capacity(" 2k ").unwrap(), 2048);

        assert_matches!(parse_capacity(""), Err(Error::CapacityParse(_)));
        assert_matches!(parse_capacity("G"), Err(Error::CapacityParse(_)));
        assert_matches!(parse_capacity("10X"), Err(Error::CapacityParse(_)));
        assert_matches!(
            parse_capacity("18446744073709551615T"),
            Err(Error::CapacityParse(_))
        );
    }
}
