// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Power-on defaults of the simulated device

use serde::{Deserialize, Serialize};

/// Values written into the register banks when a data model is initialized.
///
/// Setpoints use the same fixed-point scaling as their registers: a value of
/// `225` for the temperature setpoint means 22.5 °C.
///
/// # Example
///
/// ```
/// use hvac_modbus_simulator::config::DeviceDefaults;
///
/// let defaults = DeviceDefaults {
///     fan_rpm_setpoint: 1200,
///     ..DeviceDefaults::default()
/// };
/// assert_eq!(defaults.airflow_setpoint, 250);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDefaults {
    /// Airflow setpoint, ×10 m³/min (default 25.0 m³/min)
    pub airflow_setpoint: u16,
    /// Temperature setpoint, ×10 °C (default 22.5 °C)
    pub temperature_setpoint: u16,
    /// Fan mode override: 0=auto, 1=low, 2=high
    pub fan_mode: u16,
    /// Fan speed setpoint in RPM
    pub fan_rpm_setpoint: u16,
    /// Sensor simulation flag: 0=frozen, 1=simulated
    pub sim_enable: u16,
    /// Initial state of the fan enable coil
    pub fan_enabled: bool,
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            airflow_setpoint: 250,
            temperature_setpoint: 225,
            fan_mode: 0,
            fan_rpm_setpoint: 900,
            sim_enable: 1,
            fan_enabled: true,
        }
    }
}
