//! Storage Backend Adapters
//!
//! One adapter per pool type:
//! - Sheepdog: network block volumes managed through `collie`

pub mod sheepdog;

pub use sheepdog::*;

use crate::config::SheepdogConfig;
use crate::domain::model::PoolType;
use crate::domain::ports::{ProcessRunnerRef, StorageBackendRef};
use crate::error::Result;
use std::sync::Arc;

/// Factory for creating storage backend adapters
pub struct BackendFactory;

impl BackendFactory {
    /// Create the backend serving `pool_type`
    pub fn for_pool_type(
        pool_type: PoolType,
        config: BackendConfig,
        runner: ProcessRunnerRef,
    ) -> StorageBackendRef {
        match pool_type {
            PoolType::Sheepdog => Arc::new(SheepdogBackend::new(config.sheepdog, runner)),
        }
    }

    /// Create a backend by pool type name, as found in a pool definition
    pub fn create(
        name: &str,
        config: BackendConfig,
        runner: ProcessRunnerRef,
    ) -> Result<StorageBackendRef> {
        let pool_type: PoolType = name.parse()?;
        Ok(Self::for_pool_type(pool_type, config, runner))
    }
}

/// Combined backend configuration
#[derive(Debug, Clone, Default)]
pub struct BackendConfig {
    pub sheepdog: SheepdogConfig,
}
