// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Simulation loop configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of the periodic update cycle.
///
/// Each tick runs the fan controller and then the sensor simulator against
/// the shared register banks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Enable or disable the update cycle.
    ///
    /// When disabled the registers only change through Modbus writes.
    pub enabled: bool,

    /// Time between two ticks in milliseconds. Default is 1000 ms.
    pub interval_ms: u64,
}

impl SimulationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 1000,
        }
    }
}
