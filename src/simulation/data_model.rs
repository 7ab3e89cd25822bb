// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Typed view of the device register banks
//!
//! [`DataModel`] hides raw Modbus offsets behind named operations such as
//! [`DataModel::fan_enabled`] or [`DataModel::set_airflow`], and owns the
//! initialization of bank sizes and power-on values.
//!
//! A data model either owns a private [`RegisterStore`] ([`DataModel::new`]) or
//! wraps one shared with the Modbus server ([`DataModel::with_store`]). Two
//! models wrapping the same store observe each other's writes immediately.

use log::debug;

use crate::config::DeviceDefaults;
use crate::modbus::address_map::{self, coil, di, hr, ir};
use crate::modbus::{Bank, BitBank, RegisterBank, RegisterBanks, RegisterError, RegisterStore};

/// Fan speed state as exposed in the fan state input register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanState {
    Off,
    Low,
    High,
}

impl FanState {
    /// Register encoding: 0=off, 1=low, 2=high.
    pub fn as_register(self) -> u16 {
        match self {
            FanState::Off => 0,
            FanState::Low => 1,
            FanState::High => 2,
        }
    }

    /// Decode the fan state register. Anything above 1 reads as high speed.
    pub fn from_register(value: u16) -> Self {
        match value {
            0 => FanState::Off,
            1 => FanState::Low,
            _ => FanState::High,
        }
    }

    /// Explicit speed requested by the fan mode holding register, if any.
    ///
    /// Only 1 and 2 are overrides; 0 and every out-of-range value fall back to
    /// the coil-based selection.
    pub fn from_mode_command(value: u16) -> Option<Self> {
        match value {
            1 => Some(FanState::Low),
            2 => Some(FanState::High),
            _ => None,
        }
    }

    pub fn is_running(self) -> bool {
        self != FanState::Off
    }
}

/// Semantic accessors over the shared register banks.
#[derive(Debug, Clone)]
pub struct DataModel {
    store: RegisterStore,
    defaults: DeviceDefaults,
}

impl DataModel {
    /// Data model over a private store, initialized with the default device values.
    pub fn new() -> Result<Self, RegisterError> {
        Self::with_store(RegisterStore::new())
    }

    /// Data model over a store shared with other components.
    ///
    /// The banks are (re)sized and the power-on values are written, so any
    /// content already in `store` is discarded.
    pub fn with_store(store: RegisterStore) -> Result<Self, RegisterError> {
        Self::with_defaults(store, DeviceDefaults::default())
    }

    pub fn with_defaults(store: RegisterStore, defaults: DeviceDefaults) -> Result<Self, RegisterError> {
        let model = Self { store, defaults };
        model.initialize_banks();
        model.initialize_defaults()?;
        Ok(model)
    }

    pub fn store(&self) -> &RegisterStore {
        &self.store
    }

    pub fn defaults(&self) -> &DeviceDefaults {
        &self.defaults
    }

    /// Size every bank for the address map and zero it.
    ///
    /// Safe to call again to reset the device without reconstructing the model.
    pub fn initialize_banks(&self) {
        self.store.transaction(|banks| {
            for bank in [
                Bank::InputRegisters,
                Bank::HoldingRegisters,
                Bank::Coils,
                Bank::DiscreteInputs,
            ] {
                banks.reset(bank, address_map::bank_size(bank));
            }
        });
    }

    /// Write the configured setpoints and the fan enable coil.
    pub fn initialize_defaults(&self) -> Result<(), RegisterError> {
        let d = &self.defaults;
        debug!("Writing device defaults: {:?}", d);
        self.store.transaction(|banks| {
            banks.set_register(RegisterBank::Holding, hr::AIRFLOW_SETPOINT, d.airflow_setpoint)?;
            banks.set_register(
                RegisterBank::Holding,
                hr::TEMPERATURE_SETPOINT,
                d.temperature_setpoint,
            )?;
            banks.set_register(RegisterBank::Holding, hr::FAN_MODE_CMD, d.fan_mode)?;
            banks.set_register(RegisterBank::Holding, hr::FAN_RPM_SETPOINT, d.fan_rpm_setpoint)?;
            banks.set_register(RegisterBank::Holding, hr::SIM_ENABLE, d.sim_enable)?;
            banks.set_bit(BitBank::Coils, coil::FAN_ENABLE, d.fan_enabled)
        })
    }

    // --- generic single-cell access --------------------------------------

    pub fn read_input(&self, addr: u16) -> Result<u16, RegisterError> {
        self.store.transaction(|banks| banks.register(RegisterBank::Input, addr))
    }

    pub fn write_input(&self, addr: u16, value: u16) -> Result<(), RegisterError> {
        self.store
            .transaction(|banks| banks.set_register(RegisterBank::Input, addr, value))
    }

    pub fn read_holding(&self, addr: u16) -> Result<u16, RegisterError> {
        self.store.transaction(|banks| banks.register(RegisterBank::Holding, addr))
    }

    pub fn write_holding(&self, addr: u16, value: u16) -> Result<(), RegisterError> {
        self.store
            .transaction(|banks| banks.set_register(RegisterBank::Holding, addr, value))
    }

    pub fn read_coil(&self, addr: u16) -> Result<bool, RegisterError> {
        self.store.transaction(|banks| banks.bit(BitBank::Coils, addr))
    }

    pub fn write_coil(&self, addr: u16, value: bool) -> Result<(), RegisterError> {
        self.store
            .transaction(|banks| banks.set_bit(BitBank::Coils, addr, value))
    }

    pub fn read_discrete_input(&self, addr: u16) -> Result<bool, RegisterError> {
        self.store
            .transaction(|banks| banks.bit(BitBank::DiscreteInputs, addr))
    }

    pub fn write_discrete_input(&self, addr: u16, value: bool) -> Result<(), RegisterError> {
        self.store
            .transaction(|banks| banks.set_bit(BitBank::DiscreteInputs, addr, value))
    }

    // --- commands and setpoints -------------------------------------------

    pub fn airflow_setpoint(&self) -> Result<u16, RegisterError> {
        self.read_holding(hr::AIRFLOW_SETPOINT)
    }

    pub fn temperature_setpoint(&self) -> Result<u16, RegisterError> {
        self.read_holding(hr::TEMPERATURE_SETPOINT)
    }

    pub fn fan_mode_cmd(&self) -> Result<u16, RegisterError> {
        self.read_holding(hr::FAN_MODE_CMD)
    }

    pub fn set_fan_mode_cmd(&self, mode: u16) -> Result<(), RegisterError> {
        self.write_holding(hr::FAN_MODE_CMD, mode)
    }

    pub fn fan_rpm_setpoint(&self) -> Result<u16, RegisterError> {
        self.read_holding(hr::FAN_RPM_SETPOINT)
    }

    pub fn set_fan_rpm_setpoint(&self, rpm: u16) -> Result<(), RegisterError> {
        self.write_holding(hr::FAN_RPM_SETPOINT, rpm)
    }

    /// Only a flag value of exactly 1 enables the sensor simulation; any other
    /// value freezes the sensor registers.
    pub fn sim_enabled(&self) -> Result<bool, RegisterError> {
        Ok(self.read_holding(hr::SIM_ENABLE)? == 1)
    }

    pub fn set_sim_enabled(&self, enabled: bool) -> Result<(), RegisterError> {
        self.write_holding(hr::SIM_ENABLE, u16::from(enabled))
    }

    pub fn fan_enabled(&self) -> Result<bool, RegisterError> {
        self.read_coil(coil::FAN_ENABLE)
    }

    pub fn set_fan_enabled(&self, enabled: bool) -> Result<(), RegisterError> {
        self.write_coil(coil::FAN_ENABLE, enabled)
    }

    pub fn fan_high_requested(&self) -> Result<bool, RegisterError> {
        self.read_coil(coil::FAN_HIGH_REQUEST)
    }

    pub fn set_fan_high_request(&self, requested: bool) -> Result<(), RegisterError> {
        self.write_coil(coil::FAN_HIGH_REQUEST, requested)
    }

    /// Raise the alarm reset coil, as a Modbus client would.
    pub fn request_alarm_reset(&self) -> Result<(), RegisterError> {
        self.write_coil(coil::ALARM_RESET, true)
    }

    /// Read-and-clear the alarm reset coil.
    ///
    /// Returns `true` at most once per time the coil is set: the coil is cleared
    /// under the same lock that observed it.
    pub fn consume_alarm_reset(&self) -> Result<bool, RegisterError> {
        self.store.transaction(|banks| {
            let requested = banks.bit(BitBank::Coils, coil::ALARM_RESET)?;
            if requested {
                banks.set_bit(BitBank::Coils, coil::ALARM_RESET, false)?;
            }
            Ok(requested)
        })
    }

    /// Publish the outputs of one fan controller step under a single lock.
    ///
    /// Writes the fan state with its running bit, the RPM and the fault, then
    /// consumes the alarm reset coil; a consumed reset clears the fault just
    /// written. Returns whether a reset was consumed.
    ///
    /// The step is all-or-nothing: if any cell is out of range the banks are
    /// restored and no output of this step is visible.
    pub fn publish_fan_outputs(
        &self,
        state: FanState,
        rpm: u16,
        fault: bool,
    ) -> Result<bool, RegisterError> {
        self.store.transaction(|banks| {
            let snapshot = banks.clone();
            let result = write_fan_outputs(banks, state, rpm, fault);
            if result.is_err() {
                *banks = snapshot;
            }
            result
        })
    }

    // --- measurements and status ------------------------------------------

    pub fn fan_state(&self) -> Result<FanState, RegisterError> {
        self.read_input(ir::FAN_STATE).map(FanState::from_register)
    }

    /// Write the fan state register together with the fan running input.
    pub fn set_fan_state(&self, state: FanState) -> Result<(), RegisterError> {
        self.store.transaction(|banks| {
            banks.set_register(RegisterBank::Input, ir::FAN_STATE, state.as_register())?;
            banks.set_bit(BitBank::DiscreteInputs, di::FAN_RUNNING, state.is_running())
        })
    }

    pub fn airflow(&self) -> Result<u16, RegisterError> {
        self.read_input(ir::AIRFLOW)
    }

    pub fn set_airflow(&self, value_scaled: u16) -> Result<(), RegisterError> {
        self.write_input(ir::AIRFLOW, value_scaled)
    }

    pub fn temperature(&self) -> Result<u16, RegisterError> {
        self.read_input(ir::TEMPERATURE)
    }

    pub fn set_temperature(&self, value_scaled: u16) -> Result<(), RegisterError> {
        self.write_input(ir::TEMPERATURE, value_scaled)
    }

    pub fn humidity(&self) -> Result<u16, RegisterError> {
        self.read_input(ir::HUMIDITY)
    }

    pub fn set_humidity(&self, value_scaled: u16) -> Result<(), RegisterError> {
        self.write_input(ir::HUMIDITY, value_scaled)
    }

    pub fn fan_rpm(&self) -> Result<u16, RegisterError> {
        self.read_input(ir::FAN_RPM)
    }

    pub fn set_fan_rpm(&self, rpm: u16) -> Result<(), RegisterError> {
        self.write_input(ir::FAN_RPM, rpm)
    }

    pub fn fan_fault(&self) -> Result<bool, RegisterError> {
        self.read_discrete_input(di::FAN_FAULT)
    }

    pub fn set_fault(&self, fault: bool) -> Result<(), RegisterError> {
        self.write_discrete_input(di::FAN_FAULT, fault)
    }

    pub fn filter_dirty(&self) -> Result<bool, RegisterError> {
        self.read_discrete_input(di::FILTER_DIRTY)
    }

    pub fn set_filter_dirty(&self, dirty: bool) -> Result<(), RegisterError> {
        self.write_discrete_input(di::FILTER_DIRTY, dirty)
    }

    pub fn fan_running(&self) -> Result<bool, RegisterError> {
        self.read_discrete_input(di::FAN_RUNNING)
    }
}

fn write_fan_outputs(
    banks: &mut RegisterBanks,
    state: FanState,
    rpm: u16,
    fault: bool,
) -> Result<bool, RegisterError> {
    banks.set_register(RegisterBank::Input, ir::FAN_STATE, state.as_register())?;
    banks.set_bit(BitBank::DiscreteInputs, di::FAN_RUNNING, state.is_running())?;
    banks.set_register(RegisterBank::Input, ir::FAN_RPM, rpm)?;
    banks.set_bit(BitBank::DiscreteInputs, di::FAN_FAULT, fault)?;

    let reset = banks.bit(BitBank::Coils, coil::ALARM_RESET)?;
    if reset {
        banks.set_bit(BitBank::Coils, coil::ALARM_RESET, false)?;
        banks.set_bit(BitBank::DiscreteInputs, di::FAN_FAULT, false)?;
    }
    Ok(reset)
}

/// Convert a simulated value to a register cell, saturating at both ends.
pub(crate) fn to_register(value: i32) -> u16 {
    value.clamp(0, i32::from(u16::MAX)) as u16
}
