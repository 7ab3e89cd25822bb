// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Fan controller behaviour with deterministic jitter

use hvac_modbus_simulator::simulation::{
    DataModel, FanController, FanState, FanStatus, FixedJitter, SequenceJitter,
};

fn controller(model: &DataModel) -> FanController<FixedJitter> {
    FanController::with_jitter(model.clone(), FixedJitter(0))
}

#[test]
fn test_disabled_fan_is_off() {
    let model = DataModel::new().unwrap();
    model.set_fan_enabled(false).unwrap();
    model.set_fan_mode_cmd(2).unwrap();
    model.set_fan_high_request(true).unwrap();

    let status = controller(&model).update().unwrap();
    assert_eq!(
        status,
        FanStatus {
            state: FanState::Off,
            rpm: 0,
            fault: false,
        }
    );
    assert_eq!(model.fan_state().unwrap(), FanState::Off);
    assert_eq!(model.fan_rpm().unwrap(), 0);
    assert!(!model.fan_fault().unwrap());
    assert!(!model.fan_running().unwrap());
}

#[test]
fn test_low_mode_command() {
    let model = DataModel::new().unwrap();
    model.set_fan_mode_cmd(1).unwrap();
    model.set_fan_rpm_setpoint(500).unwrap();

    let status = controller(&model).update().unwrap();
    assert_eq!(status.state, FanState::Low);
    assert_eq!(status.rpm, 300);
    assert_eq!(model.fan_rpm().unwrap(), 300);
    assert!(model.fan_running().unwrap());
    assert!(!model.fan_fault().unwrap());
}

#[test]
fn test_high_mode_command() {
    let model = DataModel::new().unwrap();
    model.set_fan_mode_cmd(2).unwrap();
    model.set_fan_rpm_setpoint(800).unwrap();

    let status = controller(&model).update().unwrap();
    assert_eq!(status.state, FanState::High);
    assert_eq!(model.fan_rpm().unwrap(), 800);
}

#[test]
fn test_auto_mode_follows_high_request_coil() {
    let model = DataModel::new().unwrap();
    let mut fan = controller(&model);

    model.set_fan_high_request(true).unwrap();
    assert_eq!(fan.update().unwrap().state, FanState::High);

    model.set_fan_high_request(false).unwrap();
    assert_eq!(fan.update().unwrap().state, FanState::Low);
}

#[test]
fn test_out_of_range_mode_falls_back_to_coil() {
    let model = DataModel::new().unwrap();
    model.set_fan_mode_cmd(3).unwrap();
    model.set_fan_high_request(true).unwrap();

    assert_eq!(controller(&model).update().unwrap().state, FanState::High);
    // The command register is left as written
    assert_eq!(model.fan_mode_cmd().unwrap(), 3);
}

#[test]
fn test_fault_below_threshold_and_alarm_reset() {
    let model = DataModel::new().unwrap();
    model.set_fan_mode_cmd(1).unwrap();
    model.set_fan_rpm_setpoint(160).unwrap();
    let mut fan = controller(&model);

    let status = fan.update().unwrap();
    assert_eq!(status.rpm, 96);
    assert!(status.fault);
    assert!(model.fan_fault().unwrap());

    model.request_alarm_reset().unwrap();
    let status = fan.update().unwrap();
    assert!(!status.fault);
    assert!(!model.fan_fault().unwrap());
    assert!(!model.read_coil(2).unwrap());

    // The condition persists, so the next tick raises the fault again
    assert!(fan.update().unwrap().fault);
}

#[test]
fn test_fault_exactly_at_threshold() {
    let model = DataModel::new().unwrap();
    model.set_fan_mode_cmd(2).unwrap();
    model.set_fan_rpm_setpoint(100).unwrap();

    let mut fan = FanController::with_jitter(model.clone(), SequenceJitter::new(vec![0, -1]));
    assert!(!fan.update().unwrap().fault);
    assert_eq!(model.fan_rpm().unwrap(), 100);
    assert!(fan.update().unwrap().fault);
    assert_eq!(model.fan_rpm().unwrap(), 99);
}

#[test]
fn test_jitter_is_applied() {
    let model = DataModel::new().unwrap();
    model.set_fan_mode_cmd(2).unwrap();
    let mut fan = FanController::with_jitter(model.clone(), SequenceJitter::new(vec![15, -15]));

    assert_eq!(fan.update().unwrap().rpm, 915);
    assert_eq!(fan.update().unwrap().rpm, 885);
}

#[test]
fn test_random_jitter_stays_within_bounds() {
    let model = DataModel::new().unwrap();
    let mut fan = FanController::new(model.clone());

    for _ in 0..200 {
        let rpm = fan.update().unwrap().rpm;
        // Low speed around 900 * 0.6
        assert!((530..=550).contains(&rpm), "rpm {} out of bounds", rpm);
    }
}
