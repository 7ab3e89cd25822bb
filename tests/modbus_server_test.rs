// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Tests for the HvacModbusServer implementation
//!
//! These tests start a server on an OS-assigned port over a freshly initialized
//! data model and talk to it with a real Modbus TCP client. They cover every
//! supported function code, the exception paths and the sharing of the banks
//! between the wire and the simulation.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time;
use tokio_modbus::prelude::*;

use hvac_modbus_simulator::modbus::address_map::{coil, di, hr, ir};
use hvac_modbus_simulator::modbus::serve;
use hvac_modbus_simulator::simulation::{
    DataModel, FanController, FanState, FixedJitter, SensorSimulator,
};

/// Test utility function to start a Modbus server in the background
async fn start_test_server(
) -> Result<(SocketAddr, DataModel, tokio::task::JoinHandle<()>), Box<dyn std::error::Error>> {
    let model = DataModel::new()?;

    // Use port 0 to let the OS assign an available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let socket_addr = listener.local_addr()?;

    let store = model.store().clone();
    let handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, store).await {
            eprintln!("Server error: {}", e);
        }
    });

    // Give the server a moment to start
    time::sleep(Duration::from_millis(50)).await;

    Ok((socket_addr, model, handle))
}

#[tokio::test]
async fn test_read_default_holding_registers() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, _model, _server_handle) = start_test_server().await?;
    let mut ctx = tcp::connect(socket_addr).await?;

    let data = ctx.read_holding_registers(0, 5).await??;
    assert_eq!(data, vec![250, 225, 0, 900, 1]);

    let coils = ctx.read_coils(0, 3).await??;
    assert_eq!(coils, vec![true, false, false]);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_read_input_registers_follow_simulation() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, model, _server_handle) = start_test_server().await?;
    let mut ctx = tcp::connect(socket_addr).await?;

    // Before any tick every measurement is zero
    let data = ctx.read_input_registers(0, 5).await??;
    assert_eq!(data, vec![0, 0, 0, 0, 0]);

    FanController::with_jitter(model.clone(), FixedJitter(0)).update()?;
    SensorSimulator::with_jitter(model.clone(), FixedJitter(0)).update()?;

    let data = ctx.read_input_registers(0, 5).await??;
    assert_eq!(data[ir::AIRFLOW as usize], 200);
    assert_eq!(data[ir::TEMPERATURE as usize], 220);
    assert_eq!(data[ir::HUMIDITY as usize], 500);
    assert_eq!(data[ir::FAN_RPM as usize], 540);
    assert_eq!(data[ir::FAN_STATE as usize], 1);

    let inputs = ctx.read_discrete_inputs(0, 3).await??;
    assert!(!inputs[di::FAN_FAULT as usize]);
    assert!(!inputs[di::FILTER_DIRTY as usize]);
    assert!(inputs[di::FAN_RUNNING as usize]);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_write_single_register() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, model, _server_handle) = start_test_server().await?;
    let mut ctx = tcp::connect(socket_addr).await?;

    ctx.write_single_register(hr::FAN_MODE_CMD, 2).await??;

    let data = ctx.read_holding_registers(hr::FAN_MODE_CMD, 1).await??;
    assert_eq!(data, vec![2]);
    assert_eq!(model.fan_mode_cmd()?, 2);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_write_multiple_registers() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, model, _server_handle) = start_test_server().await?;
    let mut ctx = tcp::connect(socket_addr).await?;

    ctx.write_multiple_registers(hr::TEMPERATURE_SETPOINT, &[210, 1, 1200])
        .await??;

    let data = ctx.read_holding_registers(0, 4).await??;
    assert_eq!(data, vec![250, 210, 1, 1200]);
    assert_eq!(model.fan_rpm_setpoint()?, 1200);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_write_coils() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, model, _server_handle) = start_test_server().await?;
    let mut ctx = tcp::connect(socket_addr).await?;

    ctx.write_single_coil(coil::FAN_HIGH_REQUEST, true).await??;
    assert!(model.fan_high_requested()?);

    ctx.write_multiple_coils(coil::FAN_ENABLE, &[false, false])
        .await??;
    assert!(!model.fan_enabled()?);
    assert!(!model.fan_high_requested()?);

    let coils = ctx.read_coils(0, 3).await??;
    assert_eq!(coils, vec![false, false, false]);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_alarm_reset_over_the_wire() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, model, _server_handle) = start_test_server().await?;
    let mut ctx = tcp::connect(socket_addr).await?;

    // Low speed at 160 RPM gives 96 RPM, below the fault threshold
    ctx.write_single_register(hr::FAN_MODE_CMD, 1).await??;
    ctx.write_single_register(hr::FAN_RPM_SETPOINT, 160).await??;

    let mut fan = FanController::with_jitter(model.clone(), FixedJitter(0));
    fan.update()?;
    let inputs = ctx.read_discrete_inputs(di::FAN_FAULT, 1).await??;
    assert_eq!(inputs, vec![true]);

    ctx.write_single_coil(coil::ALARM_RESET, true).await??;
    fan.update()?;

    let inputs = ctx.read_discrete_inputs(di::FAN_FAULT, 1).await??;
    assert_eq!(inputs, vec![false]);
    let coils = ctx.read_coils(coil::ALARM_RESET, 1).await??;
    assert_eq!(coils, vec![false]);

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_invalid_register_address() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, _model, _server_handle) = start_test_server().await?;
    let mut ctx = tcp::connect(socket_addr).await?;

    let result = ctx.read_input_registers(100, 1).await?;
    assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));

    // Straddling the end of the bank is rejected as a whole
    let result = ctx.read_holding_registers(30, 4).await?;
    assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));

    let result = ctx.write_single_coil(16, true).await?;
    assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));

    let result = ctx.read_discrete_inputs(15, 2).await?;
    assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_unsupported_function() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, _model, _server_handle) = start_test_server().await?;
    let mut ctx = tcp::connect(socket_addr).await?;

    let result = ctx
        .read_write_multiple_registers(0, 1, hr::FAN_MODE_CMD, &[2])
        .await?;
    assert_eq!(result, Err(ExceptionCode::IllegalFunction));

    ctx.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_multiple_clients() -> Result<(), Box<dyn std::error::Error>> {
    let (socket_addr, model, _server_handle) = start_test_server().await?;

    let mut client1 = tcp::connect(socket_addr).await?;
    let mut client2 = tcp::connect(socket_addr).await?;

    client1.write_single_register(hr::FAN_MODE_CMD, 2).await??;
    client1.write_single_register(hr::FAN_RPM_SETPOINT, 800).await??;

    let data = client2.read_holding_registers(hr::FAN_MODE_CMD, 2).await??;
    assert_eq!(data, vec![2, 800]);

    FanController::with_jitter(model.clone(), FixedJitter(0)).update()?;
    assert_eq!(model.fan_state()?, FanState::High);

    let data = client2.read_input_registers(ir::FAN_RPM, 2).await??;
    assert_eq!(data, vec![800, 2]);

    client1.disconnect().await?;
    client2.disconnect().await?;
    Ok(())
}
