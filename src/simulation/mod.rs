// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Device Simulation
//!
//! Behaviour of the simulated air handling unit, layered on the register banks:
//!
//! * [`DataModel`]: named accessors and power-on initialization
//! * [`FanController`]: fan state machine, RPM and fault detection
//! * [`SensorSimulator`]: temperature, humidity, airflow and dirty filter
//! * [`UpdateCycle`]: runs both components once per tick
//!
//! Randomness is injected through [`JitterSource`], so every component can be
//! driven deterministically.
//!
//! ## Example
//!
//! ```rust
//! use hvac_modbus_simulator::simulation::{
//!     DataModel, FanController, FanState, FixedJitter, SensorSimulator, UpdateCycle,
//! };
//!
//! let model = DataModel::new().unwrap();
//! let mut cycle = UpdateCycle::with_components(
//!     FanController::with_jitter(model.clone(), FixedJitter(0)),
//!     SensorSimulator::with_jitter(model.clone(), FixedJitter(0)),
//! );
//! cycle.tick();
//!
//! assert_eq!(model.fan_state().unwrap(), FanState::Low);
//! assert_eq!(model.fan_rpm().unwrap(), 540);
//! assert_eq!(model.airflow().unwrap(), 200);
//! ```

pub mod data_model;
pub mod fan_controller;
pub mod jitter;
pub mod sensor_simulator;
pub mod update_cycle;

pub use data_model::{DataModel, FanState};
pub use fan_controller::{derive_fan_state, FanController, FanStatus, FAULT_RPM_THRESHOLD};
pub use jitter::{FixedJitter, JitterSource, RandomJitter, SequenceJitter};
pub use sensor_simulator::{SensorReadings, SensorSimulator, DIRTY_FILTER_AIRFLOW};
pub use update_cycle::{TickReport, UpdateCycle};
