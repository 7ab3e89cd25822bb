// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Airflow, temperature and humidity simulation
//!
//! Produces plausible sensor readings tied to the fan state written by the
//! [`FanController`](super::FanController) during the same tick. All values
//! use the x10 scaling of the address map.

use log::debug;

use super::data_model::{to_register, DataModel};
use super::jitter::{JitterSource, RandomJitter};
use crate::modbus::address_map::ir;
use crate::modbus::RegisterError;

/// Ambient temperature with the fan stopped is `BASE + OFF_OFFSET`.
const TEMPERATURE_BASE: i32 = 225;
const TEMPERATURE_OFF_OFFSET: i32 = 30;
/// Cooling effect per speed step.
const TEMPERATURE_STEP: i32 = -5;
const TEMPERATURE_MIN: i32 = 150;
const TEMPERATURE_MAX: i32 = 300;

const HUMIDITY_BASE: i32 = 500;

const AIRFLOW_LOW: i32 = 200;
const AIRFLOW_HIGH: i32 = 350;
/// Below this airflow a running fan signals a dirty filter.
pub const DIRTY_FILTER_AIRFLOW: u16 = 100;

/// Values written by one simulator update, in register units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReadings {
    pub temperature: u16,
    pub humidity: u16,
    pub airflow: u16,
    pub filter_dirty: bool,
}

/// Derives the sensor inputs from the fan state of the current tick.
///
/// Runs after the [`FanController`](super::FanController) on the same
/// [`DataModel`]. Offsets come from the injected [`JitterSource`]; the
/// simulation flag holding register can freeze every sensor register.
pub struct SensorSimulator<J: JitterSource = RandomJitter> {
    model: DataModel,
    jitter: J,
}

impl SensorSimulator<RandomJitter> {
    pub fn new(model: DataModel) -> Self {
        Self::with_jitter(model, RandomJitter::new())
    }
}

impl<J: JitterSource> SensorSimulator<J> {
    pub fn with_jitter(model: DataModel, jitter: J) -> Self {
        Self { model, jitter }
    }

    pub fn model(&self) -> &DataModel {
        &self.model
    }

    /// Run one simulation step.
    ///
    /// Returns `None` without touching any register unless the simulation flag
    /// holds exactly 1. Offsets are drawn for temperature, humidity and airflow in
    /// that order.
    pub fn update(&mut self) -> Result<Option<SensorReadings>, RegisterError> {
        if !self.model.sim_enabled()? {
            debug!("Sensor simulation disabled, skipping");
            return Ok(None);
        }

        // Raw register value: the cooling delta scales with it
        let state = i32::from(self.model.read_input(ir::FAN_STATE)?);

        let delta = if state == 0 {
            TEMPERATURE_OFF_OFFSET
        } else {
            TEMPERATURE_STEP * state
        };
        let temperature = (TEMPERATURE_BASE + delta + self.jitter.jitter(-2, 2))
            .clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
        let temperature = to_register(temperature);
        self.model.set_temperature(temperature)?;

        let humidity = to_register(HUMIDITY_BASE + self.jitter.jitter(-10, 10));
        self.model.set_humidity(humidity)?;

        let target = match state {
            0 => 0,
            1 => AIRFLOW_LOW,
            _ => AIRFLOW_HIGH,
        };
        let airflow = to_register(target + self.jitter.jitter(-5, 5));
        self.model.set_airflow(airflow)?;

        let filter_dirty = state > 0 && airflow < DIRTY_FILTER_AIRFLOW;
        self.model.set_filter_dirty(filter_dirty)?;

        let readings = SensorReadings {
            temperature,
            humidity,
            airflow,
            filter_dirty,
        };
        debug!("Sensor update: {:?}", readings);
        Ok(Some(readings))
    }
}
