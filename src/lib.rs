//! Sheepdog Pool Backend
//!
//! A storage-pool backend that manages volumes on a Sheepdog cluster by
//! running the `collie` control tool and reconciling its raw reports with
//! the pool manager's [`Pool`] and [`Volume`] records.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                 Pool manager (caller)                         │
//! │        dispatches by pool type via BackendFactory             │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 │ StorageBackend
//! ┌───────────────────────────────┴───────────────────────────────┐
//! │                      SheepdogBackend                          │
//! │  ┌──────────────┐  ┌────────────────┐  ┌──────────────────┐   │
//! │  │  HostTarget  │─▶│ CommandBuilder │  │  Report parsers  │   │
//! │  └──────────────┘  └───────┬────────┘  └────────▲─────────┘   │
//! └────────────────────────────┼────────────────────┼─────────────┘
//!                              │ ProcessRunner      │ stdout
//!                      ┌───────▼────────────────────┴──┐
//!                      │     collie (subprocess)       │
//!                      └───────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`backends`]: backend adapters and the factory choosing among them
//! - [`domain`]: pool/volume records and the backend/runner traits
//! - [`runner`]: the production process runner
//! - [`config`]: backend configuration
//! - [`error`]: error types and handling

pub mod backends;
pub mod config;
pub mod domain;
pub mod error;
pub mod runner;

// Re-export commonly used types
pub use backends::{
    BackendConfig, BackendFactory, ClusterCapacity, CommandBuilder, HostTarget, SheepdogBackend,
    SheepdogCommand, VdiUsage,
};

pub use config::SheepdogConfig;

pub use domain::model::{
    parse_capacity, OperationFlags, Pool, PoolHost, PoolType, Volume, VolumeEncryption,
    VolumeKind,
};

pub use domain::ports::{
    CommandLine, CommandOutput, ProcessRunner, ProcessRunnerRef, StorageBackend,
    StorageBackendRef,
};

pub use error::{Error, ErrorKind, Result};

pub use runner::TokioProcessRunner;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
