// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the HVAC Modbus field device simulator
use anyhow::Result;
use clap::Parser;
use hvac_modbus_simulator::{
    config::{self, Config},
    daemon::Daemon,
};
use log::{error, info};

use std::path::PathBuf;
use tokio::signal;

/// Modbus/TCP field device simulating an air handling unit
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file (created with defaults if missing)
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Address the Modbus server binds to (overrides the configuration)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// TCP port of the Modbus server (overrides the configuration)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Simulation tick interval in milliseconds (overrides the configuration)
    #[arg(long = "interval-ms")]
    interval_ms: Option<u64>,

    /// Serve the registers without running the fan and sensor simulation
    #[arg(long = "no-simulation")]
    no_simulation: bool,

    /// Validate a configuration file and exit
    #[arg(long, value_name = "FILE")]
    validate_config: Option<PathBuf>,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable all logging
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger with appropriate level based on verbose and quiet flags
    let log_level = if args.quiet {
        log::LevelFilter::Off
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    if let Some(validate_path) = args.validate_config {
        if !validate_path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file does not exist: {}",
                validate_path.display()
            ));
        }

        Config::from_file(&validate_path)
            .map_err(|err| anyhow::anyhow!("Configuration validation failed: {:#}", err))?;
        println!("Configuration file is valid: {}", validate_path.display());
        return Ok(());
    }

    let mut config = Config::from_file(&args.config)?;

    config.apply_args(
        args.host.clone(),
        args.port,
        None,
        args.interval_ms,
        args.no_simulation.then_some(false),
    );
    config::utils::validate_specific_rules(&config)?;

    info!("Starting HVAC simulator v{}", env!("CARGO_PKG_VERSION"));
    let mut daemon = Daemon::new(&config)?;
    daemon.launch(&config).await?;

    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, terminating daemon"),
        Err(err) => error!("Error waiting for shutdown signal: {}", err),
    }

    daemon.shutdown();
    daemon.join().await?;

    Ok(())
}
