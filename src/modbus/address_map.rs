// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus address map of the simulated HVAC device
//!
//! Addressing is zero-based. The offsets below are the wire contract with Modbus
//! clients and must never be renumbered without bumping [`ADDRESS_MAP_VERSION`].
//!
//! ### Input Registers (Read-Only)
//!
//! | Register Address | Description | Unit | Scaling |
//! |-----------------|-------------|------|---------|
//! | 0 | Airflow | m³/min | ×10 (0.1 m³/min resolution) |
//! | 1 | Temperature | °C | ×10 (0.1 °C resolution) |
//! | 2 | Humidity | %RH | ×10 (0.1 %RH resolution) |
//! | 3 | Fan speed | RPM | 1 |
//! | 4 | Fan state | - | 0=off, 1=low, 2=high |
//!
//! ### Holding Registers (Read/Write)
//!
//! | Register Address | Description | Default |
//! |-----------------|-------------|---------|
//! | 0 | Airflow setpoint (×10) | 250 |
//! | 1 | Temperature setpoint (×10) | 225 |
//! | 2 | Fan mode override (0=auto, 1=low, 2=high) | 0 |
//! | 3 | Fan RPM setpoint | 900 |
//! | 4 | Simulation enable (0/1) | 1 |
//!
//! ### Coils (Read/Write)
//!
//! - Coil 0: Fan enable
//! - Coil 1: Fan high-speed request
//! - Coil 2: Alarm reset (cleared by the device once consumed)
//!
//! ### Discrete Inputs (Read-Only)
//!
//! - Input 0: Fan fault
//! - Input 1: Filter dirty
//! - Input 2: Fan running

use super::register_store::Bank;

/// Version of the address map exposed to clients.
pub const ADDRESS_MAP_VERSION: u16 = 1;

/// Size given to each register bank, leaving headroom after the mapped offsets.
pub const REGISTER_BANK_SIZE: usize = 32;

/// Size given to each boolean bank.
pub const BIT_BANK_SIZE: usize = 16;

/// Input register offsets.
pub mod ir {
    pub const AIRFLOW: u16 = 0;
    pub const TEMPERATURE: u16 = 1;
    pub const HUMIDITY: u16 = 2;
    pub const FAN_RPM: u16 = 3;
    pub const FAN_STATE: u16 = 4;
}

/// Holding register offsets.
pub mod hr {
    pub const AIRFLOW_SETPOINT: u16 = 0;
    pub const TEMPERATURE_SETPOINT: u16 = 1;
    pub const FAN_MODE_CMD: u16 = 2;
    pub const FAN_RPM_SETPOINT: u16 = 3;
    pub const SIM_ENABLE: u16 = 4;
}

/// Coil offsets.
pub mod coil {
    pub const FAN_ENABLE: u16 = 0;
    pub const FAN_HIGH_REQUEST: u16 = 1;
    pub const ALARM_RESET: u16 = 2;
}

/// Discrete input offsets.
pub mod di {
    pub const FAN_FAULT: u16 = 0;
    pub const FILTER_DIRTY: u16 = 1;
    pub const FAN_RUNNING: u16 = 2;
}

/// One named cell of the address map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressEntry {
    pub bank: Bank,
    pub offset: u16,
    pub name: &'static str,
    /// Divisor turning the raw cell into the physical quantity (1 for raw values).
    pub scale: u16,
    pub unit: &'static str,
    pub meaning: &'static str,
}

const fn entry(
    bank: Bank,
    offset: u16,
    name: &'static str,
    scale: u16,
    unit: &'static str,
    meaning: &'static str,
) -> AddressEntry {
    AddressEntry {
        bank,
        offset,
        name,
        scale,
        unit,
        meaning,
    }
}

/// Every mapped cell of the device.
pub const ADDRESS_MAP: &[AddressEntry] = &[
    entry(Bank::InputRegisters, ir::AIRFLOW, "airflow", 10, "m³/min", "measured airflow"),
    entry(Bank::InputRegisters, ir::TEMPERATURE, "temperature", 10, "°C", "measured supply temperature"),
    entry(Bank::InputRegisters, ir::HUMIDITY, "humidity", 10, "%RH", "measured relative humidity"),
    entry(Bank::InputRegisters, ir::FAN_RPM, "fan_rpm", 1, "RPM", "measured fan speed"),
    entry(Bank::InputRegisters, ir::FAN_STATE, "fan_state", 1, "", "0=off, 1=low, 2=high"),
    entry(Bank::HoldingRegisters, hr::AIRFLOW_SETPOINT, "airflow_setpoint", 10, "m³/min", "airflow setpoint"),
    entry(Bank::HoldingRegisters, hr::TEMPERATURE_SETPOINT, "temperature_setpoint", 10, "°C", "temperature setpoint"),
    entry(Bank::HoldingRegisters, hr::FAN_MODE_CMD, "fan_mode_cmd", 1, "", "0=auto/off, 1=low, 2=high"),
    entry(Bank::HoldingRegisters, hr::FAN_RPM_SETPOINT, "fan_rpm_setpoint", 1, "RPM", "fan speed setpoint"),
    entry(Bank::HoldingRegisters, hr::SIM_ENABLE, "sim_enable", 1, "", "0=sensors frozen, 1=simulated"),
    entry(Bank::Coils, coil::FAN_ENABLE, "fan_enable", 1, "", "fan allowed to run"),
    entry(Bank::Coils, coil::FAN_HIGH_REQUEST, "fan_high_request", 1, "", "high speed when no mode override"),
    entry(Bank::Coils, coil::ALARM_RESET, "alarm_reset", 1, "", "clears the fan fault, self-clearing"),
    entry(Bank::DiscreteInputs, di::FAN_FAULT, "fan_fault", 1, "", "fan running below 100 RPM"),
    entry(Bank::DiscreteInputs, di::FILTER_DIRTY, "filter_dirty", 1, "", "fan running with airflow below 10.0"),
    entry(Bank::DiscreteInputs, di::FAN_RUNNING, "fan_running", 1, "", "fan state is not off"),
];

/// Entries of one bank, in offset order.
pub fn entries(bank: Bank) -> impl Iterator<Item = &'static AddressEntry> {
    ADDRESS_MAP.iter().filter(move |e| e.bank == bank)
}

pub fn lookup(bank: Bank, offset: u16) -> Option<&'static AddressEntry> {
    ADDRESS_MAP
        .iter()
        .find(|e| e.bank == bank && e.offset == offset)
}

/// Number of cells a bank must hold for the map to fit.
pub fn bank_size(bank: Bank) -> usize {
    match bank {
        Bank::InputRegisters | Bank::HoldingRegisters => REGISTER_BANK_SIZE,
        Bank::Coils | Bank::DiscreteInputs => BIT_BANK_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const BANKS: [Bank; 4] = [
        Bank::InputRegisters,
        Bank::HoldingRegisters,
        Bank::Coils,
        Bank::DiscreteInputs,
    ];

    #[test]
    fn test_every_entry_fits_its_bank() {
        for e in ADDRESS_MAP {
            assert!(
                usize::from(e.offset) < bank_size(e.bank),
                "{} does not fit in the {} bank",
                e.name,
                e.bank
            );
        }
    }

    #[test]
    fn test_offsets_and_names_are_unique() {
        let offsets: HashSet<_> = ADDRESS_MAP.iter().map(|e| (e.bank, e.offset)).collect();
        let names: HashSet<_> = ADDRESS_MAP.iter().map(|e| e.name).collect();
        assert_eq!(offsets.len(), ADDRESS_MAP.len());
        assert_eq!(names.len(), ADDRESS_MAP.len());
    }

    #[test]
    fn test_five_registers_and_three_bits_per_bank() {
        let counts: Vec<usize> = BANKS.iter().map(|b| entries(*b).count()).collect();
        assert_eq!(counts, vec![5, 5, 3, 3]);
    }

    #[test]
    fn test_scaled_quantities_use_tenths() {
        for name in ["airflow", "temperature", "humidity"] {
            let e = ADDRESS_MAP.iter().find(|e| e.name == name).unwrap();
            assert_eq!(e.scale, 10);
        }
        assert_eq!(lookup(Bank::InputRegisters, ir::FAN_RPM).unwrap().scale, 1);
        assert!(lookup(Bank::Coils, 3).is_none());
    }
}
