// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus communication module
//!
//! This module provides the register storage shared by the simulation and the
//! network, the fixed address map of the device, and the Modbus TCP server that
//! exposes both to external clients.
//!
//! ## Key Components
//!
//! - `RegisterStore`: four bounds-checked data banks behind a single lock.
//! - `address_map`: named offsets, scaling and meaning of every mapped cell.
//! - `HvacModbusServer`: the `tokio-modbus` service answering client requests.
//!
//! ## Usage
//!
//! ```no_run
//! use hvac_modbus_simulator::modbus::{serve, RegisterStore};
//! use tokio::net::TcpListener;
//!
//! async fn run(store: RegisterStore) -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:5002").await?;
//!     serve(listener, store).await
//! }
//! ```

pub mod address_map;
pub mod modbus_server;
pub mod register_store;

pub use modbus_server::{serve, HvacModbusServer};
pub use register_store::{Bank, BitBank, RegisterBank, RegisterBanks, RegisterError, RegisterStore};
