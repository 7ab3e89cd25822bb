// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Modbus server implementation for the simulated HVAC device
//!
//! For avoiding confusion with the Modbus master/slave terminology, this module uses
//! the terms "server" and "client" instead. The server is the device that provides data,
//! while the client is the device that requests data.
//!
//! The Modbus master is the device that requests data, while the Modbus slave is the device
//! that provides data. In other words, the Modbus master is here the client and the
//! Modbus slave is here the server.
//!
//! The server does not own any register values: every connection gets an
//! [`HvacModbusServer`] wrapping a clone of the shared [`RegisterStore`], so
//! client writes and simulation writes land in the same banks. See
//! [`crate::modbus::address_map`] for the register map.

use std::{future, net::SocketAddr};

use log::{debug, error, info};
use tokio::net::TcpListener;
use tokio_modbus::{
    prelude::*,
    server::tcp::{accept_tcp_connection, Server},
};

use super::register_store::{BitBank, RegisterBank, RegisterError, RegisterStore};

/// A Modbus TCP service exposing the HVAC register banks.
///
/// Input registers and discrete inputs are read-only over the wire; holding
/// registers and coils accept both reads and writes.
///
/// ### Thread Safety
///
/// Each request runs under a single lock of the shared store, so a client never
/// observes half of a multi-cell update made by the simulation loop.
#[derive(Debug, Clone)]
pub struct HvacModbusServer {
    store: RegisterStore,
}

impl tokio_modbus::server::Service for HvacModbusServer {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = future::Ready<Result<Self::Response, Self::Exception>>;

    /// Process a Modbus request and provide a response
    ///
    /// This method handles the following function codes:
    /// - 0x01: Read Coils
    /// - 0x02: Read Discrete Inputs
    /// - 0x03: Read Holding Registers
    /// - 0x04: Read Input Registers
    /// - 0x05: Write Single Coil
    /// - 0x06: Write Single Register
    /// - 0x0F: Write Multiple Coils
    /// - 0x10: Write Multiple Registers
    ///
    /// Any other function code will return an IllegalFunction exception.
    fn call(&self, req: Self::Request) -> Self::Future {
        debug!("Received Modbus request: {:?}", req);
        future::ready(self.handle(req))
    }
}

impl HvacModbusServer {
    pub fn new(store: RegisterStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RegisterStore {
        &self.store
    }

    fn handle(&self, req: Request<'static>) -> Result<Response, ExceptionCode> {
        let res = match req {
            Request::ReadCoils(addr, cnt) => self
                .store
                .read_bits(BitBank::Coils, addr, cnt)
                .map(Response::ReadCoils),
            Request::ReadDiscreteInputs(addr, cnt) => self
                .store
                .read_bits(BitBank::DiscreteInputs, addr, cnt)
                .map(Response::ReadDiscreteInputs),
            Request::ReadHoldingRegisters(addr, cnt) => self
                .store
                .read_registers(RegisterBank::Holding, addr, cnt)
                .map(Response::ReadHoldingRegisters),
            Request::ReadInputRegisters(addr, cnt) => self
                .store
                .read_registers(RegisterBank::Input, addr, cnt)
                .map(Response::ReadInputRegisters),
            Request::WriteSingleCoil(addr, value) => {
                debug!("Writing value {} to coil {}", value, addr);
                self.store
                    .write_bits(BitBank::Coils, addr, std::slice::from_ref(&value))
                    .map(|_| Response::WriteSingleCoil(addr, value))
            }
            Request::WriteMultipleCoils(addr, values) => {
                debug!(
                    "Writing {} values to coils starting from address {}",
                    values.len(),
                    addr
                );
                self.store
                    .write_bits(BitBank::Coils, addr, &values)
                    .map(|_| Response::WriteMultipleCoils(addr, values.len() as u16))
            }
            Request::WriteSingleRegister(addr, value) => {
                debug!("Writing value {} to holding register {}", value, addr);
                self.store
                    .write_registers(RegisterBank::Holding, addr, std::slice::from_ref(&value))
                    .map(|_| Response::WriteSingleRegister(addr, value))
            }
            Request::WriteMultipleRegisters(addr, values) => {
                debug!(
                    "Writing {} values to holding registers starting from address {}",
                    values.len(),
                    addr
                );
                self.store
                    .write_registers(RegisterBank::Holding, addr, &values)
                    .map(|_| Response::WriteMultipleRegisters(addr, values.len() as u16))
            }
            _ => {
                error!(
                    "Exception::IllegalFunction - Unimplemented function code in request: {req:?}"
                );
                return Err(ExceptionCode::IllegalFunction);
            }
        };

        res.map_err(|err| {
            error!("Exception::IllegalDataAddress - {}", err);
            exception_for(&err)
        })
    }
}

fn exception_for(err: &RegisterError) -> ExceptionCode {
    match err {
        RegisterError::OutOfRange { .. } => ExceptionCode::IllegalDataAddress,
    }
}

/// Accept Modbus/TCP connections on `listener` until the task is aborted.
///
/// Every accepted connection is served by an [`HvacModbusServer`] sharing `store`.
pub async fn serve(listener: TcpListener, store: RegisterStore) -> anyhow::Result<()> {
    let local_addr = listener.local_addr()?;
    info!("Modbus server listening on {}", local_addr);

    let server = Server::new(listener);

    let on_connected = move |stream, socket_addr: SocketAddr| {
        let store = store.clone();
        async move {
            debug!("Modbus client connected from {}", socket_addr);
            accept_tcp_connection(stream, socket_addr, move |_socket_addr| {
                Ok(Some(HvacModbusServer::new(store.clone())))
            })
        }
    };

    let on_process_error = |err| {
        error!("Modbus server error: {err}");
    };

    server.serve(&on_connected, on_process_error).await?;
    Ok(())
}
