//! sheepdog-pool
//!
//! Runs single Sheepdog pool/volume operations from the command line and
//! prints the resulting records as JSON.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sheepdog_pool_backend::{
    parse_capacity, OperationFlags, Pool, PoolHost, Result, SheepdogBackend, SheepdogConfig,
    StorageBackend, TokioProcessRunner, Volume,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Sheepdog pool backend - inspect and manage Sheepdog volumes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pool name, used as the prefix of volume keys
    #[arg(long, default_value = "sheepdog")]
    pool: String,

    /// Cluster host (defaults to the configured address)
    #[arg(long)]
    host: Option<String>,

    /// Cluster port (defaults to the configured port)
    #[arg(long)]
    port: Option<u16>,

    /// Control tool binary
    #[arg(long, env = "SHEEPDOG_TOOL")]
    tool: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, env = "SHEEPDOG_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Refresh the pool and print capacity and volumes
    PoolInfo,
    /// Print one volume
    VolInfo { name: String },
    /// Create a volume, e.g. `vol-create vm1 10G`
    VolCreate { name: String, capacity: String },
    /// Delete a volume
    VolDelete { name: String },
    /// Resize a volume
    VolResize { name: String, capacity: String },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let mut config = match &args.config {
        Some(path) => SheepdogConfig::from_json_file(path)?,
        None => SheepdogConfig::default(),
    };
    if let Some(tool) = &args.tool {
        config.tool_path = tool.clone();
    }
    config.validate()?;

    info!("{} {}", sheepdog_pool_backend::NAME, sheepdog_pool_backend::VERSION);

    let mut pool = Pool::new(&args.pool);
    if args.host.is_some() || args.port.is_some() {
        pool.hosts.push(PoolHost {
            name: args.host.clone(),
            port: args.port,
        });
    }

    let backend = SheepdogBackend::new(config, Arc::new(TokioProcessRunner::new()));

    match args.command {
        Commands::PoolInfo => {
            backend.refresh_pool(&mut pool).await?;
            print_json(&PoolReport::from(&pool))?;
        }
        Commands::VolInfo { name } => {
            let mut volume = Volume::new(name, 0);
            backend.refresh_volume(&pool, &mut volume).await?;
            print_json(&volume)?;
        }
        Commands::VolCreate { name, capacity } => {
            let mut volume = Volume::new(name, parse_capacity(&capacity)?);
            backend.create_volume(&pool, &mut volume).await?;
            print_json(&volume)?;
        }
        Commands::VolDelete { name } => {
            let volume = Volume::new(name, 0);
            backend
                .delete_volume(&pool, &volume, OperationFlags::NONE)
                .await?;
        }
        Commands::VolResize { name, capacity } => {
            let volume = Volume::new(name, 0);
            backend
                .resize_volume(&pool, &volume, parse_capacity(&capacity)?, OperationFlags::NONE)
                .await?;
        }
    }

    Ok(())
}

/// Pool record plus its derived free space
#[derive(serde::Serialize)]
struct PoolReport<'a> {
    #[serde(flatten)]
    pool: &'a Pool,
    available: u64,
}

impl<'a> From<&'a Pool> for PoolReport<'a> {
    fn from(pool: &'a Pool) -> Self {
        Self {
            pool,
            available: pool.available(),
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs go to stderr so stdout stays machine-readable
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
