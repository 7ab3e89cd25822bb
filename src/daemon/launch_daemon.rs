// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::Config;
use crate::modbus::{self, RegisterStore};
use crate::simulation::{DataModel, UpdateCycle};

/// How often long-running tasks look at the `running` flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);
/// Interval between two heartbeat log lines.
const HEARTBEAT_PERIOD: Duration = Duration::from_secs(60);
/// Grace period granted to each task on shutdown.
const TASK_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Background services of the simulated device
///
/// The daemon owns the shared [`DataModel`] and spawns:
///
/// * the Modbus TCP server, serving the same register store
/// * the simulation loop driving the fan controller and the sensors
/// * a heartbeat that periodically logs a snapshot of the device
///
/// Every task watches a shared `running` flag cleared by [`Daemon::shutdown`].
pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    data_model: DataModel,
    modbus_address: Option<SocketAddr>,
}

impl Daemon {
    /// Create a daemon with freshly initialized register banks
    ///
    /// The banks are sized for the address map and the `device` section of the
    /// configuration is written as power-on values. Nothing is started yet.
    ///
    /// # Errors
    ///
    /// Fails if the power-on values cannot be written, which would mean the
    /// address map and the bank sizes disagree.
    pub fn new(config: &Config) -> Result<Self> {
        let data_model = DataModel::with_defaults(RegisterStore::new(), config.device.clone())
            .context("Failed to initialize the register banks")?;
        Ok(Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            data_model,
            modbus_address: None,
        })
    }

    /// Launch all configured tasks based on configuration
    pub async fn launch(&mut self, config: &Config) -> Result<()> {
        if config.modbus.enabled {
            self.start_modbus_server(config).await?;
        } else {
            info!("Modbus server disabled by configuration");
        }

        if config.simulation.enabled {
            self.start_simulation(config)?;
        } else {
            info!("Simulation disabled by configuration, registers only change over Modbus");
        }

        self.start_heartbeat()?;

        Ok(())
    }

    /// Bind the listener and spawn the Modbus server task
    ///
    /// The listener is bound before this method returns, so a bind failure is
    /// reported to the caller and [`Daemon::modbus_address`] holds the real
    /// address (useful with port 0).
    async fn start_modbus_server(&mut self, config: &Config) -> Result<()> {
        info!(
            "Starting modbus server on {}:{}",
            config.modbus.address, config.modbus.port
        );
        let listener = TcpListener::bind((config.modbus.address.as_str(), config.modbus.port))
            .await
            .with_context(|| {
                format!(
                    "Failed to bind Modbus server to {}:{}",
                    config.modbus.address, config.modbus.port
                )
            })?;
        self.modbus_address = Some(listener.local_addr()?);

        let store = self.data_model.store().clone();
        let running = self.running.clone();

        let task = tokio::spawn(async move {
            let server_handle = tokio::spawn(async move {
                if let Err(e) = modbus::serve(listener, store).await {
                    error!("Modbus server error: {:#}", e);
                }
            });

            while running.load(Ordering::SeqCst) && !server_handle.is_finished() {
                time::sleep(SHUTDOWN_POLL).await;
            }

            info!("Shutting down Modbus server...");
            server_handle.abort();

            match time::timeout(TASK_SHUTDOWN_TIMEOUT, server_handle).await {
                Ok(_) => info!("Modbus server shut down successfully"),
                Err(_) => warn!("Modbus server shutdown timed out, forcing termination"),
            }

            Ok(())
        });

        self.tasks.push(task);
        info!("Modbus server started");
        Ok(())
    }

    /// Start the periodic fan and sensor update task
    fn start_simulation(&mut self, config: &Config) -> Result<()> {
        info!(
            "Starting simulation loop every {} ms",
            config.simulation.interval_ms
        );

        let cycle = UpdateCycle::new(self.data_model.clone());
        let period = config.simulation.interval();
        let running = self.running.clone();
        let task = tokio::spawn(async move {
            cycle.run(period, running).await;
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Start a heartbeat task that logs the device status periodically
    fn start_heartbeat(&mut self) -> Result<()> {
        debug!("Starting heartbeat monitor");

        let running = self.running.clone();
        let model = self.data_model.clone();
        let task = tokio::spawn(async move {
            let mut elapsed = Duration::ZERO;
            while running.load(Ordering::SeqCst) {
                if elapsed >= HEARTBEAT_PERIOD {
                    elapsed = Duration::ZERO;
                    log_snapshot(&model);
                }
                time::sleep(SHUTDOWN_POLL).await;
                elapsed += SHUTDOWN_POLL;
            }
            Ok(())
        });

        self.tasks.push(task);
        Ok(())
    }

    /// Register banks shared by the server and the simulation.
    pub fn data_model(&self) -> &DataModel {
        &self.data_model
    }

    /// Address the Modbus server is listening on, once launched.
    pub fn modbus_address(&self) -> Option<SocketAddr> {
        self.modbus_address
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop all running tasks
    ///
    /// Only signals the tasks; call [`Daemon::join`] to wait for them.
    pub fn shutdown(&self) {
        info!("Shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Wait for all tasks to complete
    ///
    /// Each task gets a grace period; a task that panics or hangs is logged and
    /// does not prevent the others from being awaited.
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            match time::timeout(TASK_SHUTDOWN_TIMEOUT, task).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => error!("Task failed: {:#}", e),
                Ok(Err(e)) => error!("Task panicked: {}", e),
                Err(_) => warn!("Task did not complete within timeout period, may be hung"),
            }
        }
        Ok(())
    }
}

fn log_snapshot(model: &DataModel) {
    let snapshot = (|| {
        Ok::<_, crate::modbus::RegisterError>(format!(
            "state={:?} rpm={} temperature={} humidity={} airflow={} fault={} filter_dirty={}",
            model.fan_state()?,
            model.fan_rpm()?,
            model.temperature()?,
            model.humidity()?,
            model.airflow()?,
            model.fan_fault()?,
            model.filter_dirty()?,
        ))
    })();
    match snapshot {
        Ok(line) => info!("Daemon heartbeat: {}", line),
        Err(e) => warn!("Daemon heartbeat: unable to read registers: {}", e),
    }
}
