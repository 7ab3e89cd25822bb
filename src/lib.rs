// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! HVAC Modbus simulator library
//!
//! Simulates a small air handling unit (a two-speed fan with airflow,
//! temperature and humidity sensors) and exposes its state as Modbus/TCP
//! register banks.
//!
//! * [`modbus`]: register banks, address map and the Modbus TCP service
//! * [`simulation`]: data model, fan controller and sensor simulator
//! * [`config`]: YAML configuration with schema validation
//! * [`daemon`]: background tasks wiring everything together

pub mod config;
pub mod daemon;
pub mod modbus;
pub mod simulation;
