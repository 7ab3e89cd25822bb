// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Periodic update cycle
//!
//! One tick runs the fan controller and then the sensor simulator. A register
//! error in one component is logged and that component is skipped for the
//! tick, so the simulation keeps going with whatever the other one produced.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use log::{debug, error, info};
use tokio::time::{self, MissedTickBehavior};

use super::data_model::DataModel;
use super::fan_controller::{FanController, FanStatus};
use super::jitter::{JitterSource, RandomJitter};
use super::sensor_simulator::{SensorReadings, SensorSimulator};

/// Outcome of a single tick.
///
/// `fan` is `None` when the controller failed. `sensors` is `None` when the
/// simulator failed or the simulation flag is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub fan: Option<FanStatus>,
    pub sensors: Option<SensorReadings>,
}

/// Periodic driver running the fan controller then the sensor simulator.
///
/// [`UpdateCycle::tick`] runs one step synchronously and reports what each
/// component produced; [`UpdateCycle::run`] repeats it on a tokio interval
/// until the daemon's running flag is cleared.
pub struct UpdateCycle<F: JitterSource = RandomJitter, S: JitterSource = RandomJitter> {
    fan: FanController<F>,
    sensors: SensorSimulator<S>,
    ticks: u64,
}

impl UpdateCycle<RandomJitter, RandomJitter> {
    /// Cycle with random jitter, both components sharing `model`.
    pub fn new(model: DataModel) -> Self {
        Self::with_components(
            FanController::new(model.clone()),
            SensorSimulator::new(model),
        )
    }
}

impl<F: JitterSource, S: JitterSource> UpdateCycle<F, S> {
    pub fn with_components(fan: FanController<F>, sensors: SensorSimulator<S>) -> Self {
        Self {
            fan,
            sensors,
            ticks: 0,
        }
    }

    /// Number of ticks executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        debug!("Simulation tick {}", self.ticks);

        let fan = self
            .fan
            .update()
            .map_err(|e| error!("Fan controller skipped on tick {}: {}", self.ticks, e))
            .ok();

        let sensors = self
            .sensors
            .update()
            .map_err(|e| error!("Sensor simulator skipped on tick {}: {}", self.ticks, e))
            .ok()
            .flatten();

        TickReport { fan, sensors }
    }

    /// Tick every `period` until `running` is cleared.
    ///
    /// The first tick happens immediately. A tick is never interrupted; the flag
    /// is checked between ticks.
    pub async fn run(mut self, period: Duration, running: Arc<AtomicBool>) {
        info!("Simulation loop started with a {:?} interval", period);
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while running.load(Ordering::SeqCst) {
            interval.tick().await;
            if !running.load(Ordering::SeqCst) {
                break;
            }
            self.tick();
        }
        info!("Simulation loop stopped after {} ticks", self.ticks);
    }
}
