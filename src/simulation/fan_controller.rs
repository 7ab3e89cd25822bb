// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Two-speed fan state machine
//!
//! The effective speed is derived from the fan enable coil, the fan mode
//! command register and the high speed request coil. From that state the
//! controller simulates the actual RPM around the setpoint and raises the fan
//! fault input when a running fan turns too slowly.

use log::{debug, info};

use super::data_model::{to_register, DataModel, FanState};
use super::jitter::{JitterSource, RandomJitter};
use crate::modbus::RegisterError;

/// Below this speed a running fan is reported as faulty.
pub const FAULT_RPM_THRESHOLD: u16 = 100;

/// Jitter bounds applied to the low speed RPM.
const LOW_RPM_JITTER: (i32, i32) = (-10, 10);
/// Jitter bounds applied to the high speed RPM.
const HIGH_RPM_JITTER: (i32, i32) = (-15, 15);

/// Outputs written by one controller update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanStatus {
    pub state: FanState,
    pub rpm: u16,
    /// Fault input as left after the alarm reset was applied.
    pub fault: bool,
}

/// Select the fan state from the current commands.
///
/// A disabled fan is always off. Otherwise a mode command of 1 or 2 wins, and
/// any other command falls back to the high speed request coil.
pub fn derive_fan_state(fan_enabled: bool, mode_cmd: u16, high_requested: bool) -> FanState {
    if !fan_enabled {
        return FanState::Off;
    }
    match FanState::from_mode_command(mode_cmd) {
        Some(state) => state,
        None if high_requested => FanState::High,
        None => FanState::Low,
    }
}

/// Drives the fan outputs from the command registers and coils.
///
/// The controller shares its [`DataModel`] with the Modbus server and the
/// sensor simulator. Each [`FanController::update`] is one tick; RPM jitter
/// comes from the injected [`JitterSource`].
pub struct FanController<J: JitterSource = RandomJitter> {
    model: DataModel,
    jitter: J,
}

impl FanController<RandomJitter> {
    pub fn new(model: DataModel) -> Self {
        Self::with_jitter(model, RandomJitter::new())
    }
}

impl<J: JitterSource> FanController<J> {
    pub fn with_jitter(model: DataModel, jitter: J) -> Self {
        Self { model, jitter }
    }

    pub fn model(&self) -> &DataModel {
        &self.model
    }

    /// Run one control step.
    ///
    /// The commands are read and the new state, RPM and fault are derived
    /// before anything is written. The outputs are then published in one
    /// transaction: the fault is written from the new RPM first, and a pending
    /// alarm reset is consumed last and clears it for this tick. A register
    /// error leaves the previous tick's outputs in place.
    pub fn update(&mut self) -> Result<FanStatus, RegisterError> {
        let state = derive_fan_state(
            self.model.fan_enabled()?,
            self.model.fan_mode_cmd()?,
            self.model.fan_high_requested()?,
        );

        let setpoint = i32::from(self.model.fan_rpm_setpoint()?);
        let rpm = match state {
            FanState::Off => 0,
            FanState::Low => setpoint * 6 / 10 + self.jitter.jitter(LOW_RPM_JITTER.0, LOW_RPM_JITTER.1),
            FanState::High => setpoint + self.jitter.jitter(HIGH_RPM_JITTER.0, HIGH_RPM_JITTER.1),
        };
        let rpm = to_register(rpm);

        let mut fault = state.is_running() && rpm < FAULT_RPM_THRESHOLD;
        if self.model.publish_fan_outputs(state, rpm, fault)? {
            if fault {
                info!("Fan fault cleared by alarm reset");
            }
            fault = false;
        }

        debug!("Fan update: state={:?} rpm={} fault={}", state, rpm, fault);
        Ok(FanStatus { state, rpm, fault })
    }
}
