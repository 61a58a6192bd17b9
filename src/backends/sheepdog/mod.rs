//! Sheepdog Block Storage Backend
//!
//! Drives a Sheepdog cluster through the `collie` control tool and maps its
//! raw reports onto [`Pool`] and [`Volume`] records.
//!
//! Each operation runs one command at a time and only touches the caller's
//! records once every command and parse of that operation has succeeded.

pub mod command;
pub mod host;
pub mod parser;

pub use command::{CommandBuilder, SheepdogCommand};
pub use host::HostTarget;
pub use parser::{parse_node_info, parse_vdi, parse_vdi_list, ClusterCapacity, VdiUsage};

use crate::config::SheepdogConfig;
use crate::domain::model::{OperationFlags, Pool, PoolType, Volume};
use crate::domain::ports::{ProcessRunner, StorageBackend};
use crate::error::{Error, Result};
use crate::runner::TokioProcessRunner;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// Sheepdog Backend
// =============================================================================

/// Backend for `sheepdog` pools
pub struct SheepdogBackend {
    config: SheepdogConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl SheepdogBackend {
    /// Create a backend running commands through `runner`
    pub fn new(config: SheepdogConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    /// Create a backend spawning real `collie` processes
    pub fn with_config(config: SheepdogConfig) -> Self {
        Self::new(config, Arc::new(TokioProcessRunner::new()))
    }

    pub fn config(&self) -> &SheepdogConfig {
        &self.config
    }

    /// Command builder aimed at the pool's cluster
    pub fn command_builder(&self, pool: &Pool) -> CommandBuilder {
        CommandBuilder::new(
            self.config.tool_path.clone(),
            HostTarget::resolve(&pool.hosts, &self.config),
        )
    }

    /// Run one command and return its raw stdout if it exited cleanly
    async fn execute(&self, pool: &Pool, command: &SheepdogCommand) -> Result<Vec<u8>> {
        let line = self.command_builder(pool).build(command);
        debug!("Pool {}: running {}", pool.name, line);

        let output = self.runner.run(&line).await?;
        if !output.is_success() {
            warn!(
                "Pool {}: {} failed with {}",
                pool.name,
                command.operation(),
                output.status_description()
            );
            return Err(Error::CommandFailed {
                command: line.to_string(),
                status: output.status_description(),
                diagnostic: output.diagnostic(),
            });
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl StorageBackend for SheepdogBackend {
    fn pool_type(&self) -> PoolType {
        PoolType::Sheepdog
    }

    async fn refresh_pool(&self, pool: &mut Pool) -> Result<()> {
        let node_info = self.execute(pool, &SheepdogCommand::NodeInfo).await?;
        let capacity = parse_node_info(&node_info)?;

        let vdi_list = self.execute(pool, &SheepdogCommand::VdiList).await?;
        let volumes = parse_vdi_list(&pool.name, &vdi_list)?;

        debug!(
            "Pool {}: {} of {} bytes used, {} volumes",
            pool.name,
            capacity.allocation,
            capacity.capacity,
            volumes.len()
        );

        pool.capacity = capacity.capacity;
        pool.allocation = capacity.allocation;
        pool.volumes = volumes;
        Ok(())
    }

    async fn create_volume(&self, pool: &Pool, volume: &mut Volume) -> Result<()> {
        if let Some(encryption) = &volume.encryption {
            return Err(Error::UnsupportedConfiguration(format!(
                "Sheepdog does not support encrypted volumes ({} requested for {})",
                encryption.format, volume.name
            )));
        }

        info!(
            "Creating Sheepdog volume: {} ({} bytes) in pool {}",
            volume.name, volume.capacity, pool.name
        );

        let created = self
            .execute(
                pool,
                &SheepdogCommand::VdiCreate {
                    name: volume.name.clone(),
                    capacity: volume.capacity,
                },
            )
            .await
            .map(|_| ());

        // The create's exit status decides the result, not the refresh
        if let Err(e) = self.refresh_volume(pool, volume).await {
            warn!(
                "Pool {}: could not refresh volume {} after create: {}",
                pool.name, volume.name, e
            );
        }

        created
    }

    async fn refresh_volume(&self, pool: &Pool, volume: &mut Volume) -> Result<()> {
        let output = self
            .execute(
                pool,
                &SheepdogCommand::VdiListOne {
                    name: volume.name.clone(),
                },
            )
            .await?;
        let usage = parse_vdi(&output)?;

        volume.capacity = usage.capacity;
        volume.allocation = usage.allocation;
        volume.bind_to(&pool.name);
        Ok(())
    }

    async fn delete_volume(
        &self,
        pool: &Pool,
        volume: &Volume,
        flags: OperationFlags,
    ) -> Result<()> {
        flags.ensure_none("vdi delete")?;

        info!("Deleting Sheepdog volume: {} in pool {}", volume.name, pool.name);
        let command = SheepdogCommand::VdiDelete {
            name: volume.name.clone(),
        };
        self.execute(pool, &command).await.map(|_| ())
    }

    async fn resize_volume(
        &self,
        pool: &Pool,
        volume: &Volume,
        capacity: u64,
        flags: OperationFlags,
    ) -> Result<()> {
        flags.ensure_none("vdi resize")?;

        info!(
            "Resizing Sheepdog volume: {} in pool {} to {} bytes",
            volume.name, pool.name, capacity
        );
        let command = SheepdogCommand::VdiResize {
            name: volume.name.clone(),
            capacity,
        };
        self.execute(pool, &command).await.map(|_| ())
    }
}
