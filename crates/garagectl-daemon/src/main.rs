//! garagectld - garage door accessory daemon.
//!
//! Wires the reconciliation core to an SSH transport: loads the TOML
//! configuration, probes the initial door position, runs the periodic
//! evaluation loop, and logs settled-state pushes until interrupted.
//! After startup no remote failure is fatal; an unreachable controller
//! host degrades to perpetual transitional reporting.

mod config;
mod hub;
mod ssh;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use garagectl_accessory::DoorAccessory;
use garagectl_core::probe::StateProbe;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError, DEFAULT_CONFIG_PATH};
use crate::hub::TracingHub;
use crate::ssh::SshTransport;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "garagectld", version, about = "Garage door accessory daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

/// Errors that stop the daemon.
#[derive(Debug, thiserror::Error)]
enum DaemonError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Shutdown signal handling failed.
    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "daemon failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<(), DaemonError> {
    let config = Config::load(&args.config)?;
    info!(
        name = %config.door.name,
        host = %config.ssh.host,
        "starting accessory"
    );

    let transport = SshTransport::new(&config.ssh);
    let probe = StateProbe::new(
        transport,
        config.door.status_command.clone(),
        config.door.control_command.clone(),
    );
    let hub = Arc::new(TracingHub::new(config.door.name.clone()));
    let accessory = DoorAccessory::start(probe, hub, config.door.reconciler()).await;

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    accessory.shutdown().await;
    Ok(())
}
