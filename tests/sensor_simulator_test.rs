// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Sensor simulator behaviour with deterministic jitter

use hvac_modbus_simulator::simulation::{
    DataModel, FanState, FixedJitter, SensorReadings, SensorSimulator, SequenceJitter,
};

fn model_with_state(state: FanState) -> DataModel {
    let model = DataModel::new().unwrap();
    model.set_fan_state(state).unwrap();
    model
}

#[test]
fn test_fan_off_readings() {
    let model = model_with_state(FanState::Off);
    let mut sensors = SensorSimulator::with_jitter(model.clone(), FixedJitter(0));

    let readings = sensors.update().unwrap();
    assert_eq!(
        readings,
        Some(SensorReadings {
            temperature: 255,
            humidity: 500,
            airflow: 0,
            filter_dirty: false,
        })
    );
    assert_eq!(model.temperature().unwrap(), 255);
    assert_eq!(model.humidity().unwrap(), 500);
    assert_eq!(model.airflow().unwrap(), 0);
    assert!(!model.filter_dirty().unwrap());
}

#[test]
fn test_low_speed_readings() {
    let model = model_with_state(FanState::Low);
    SensorSimulator::with_jitter(model.clone(), FixedJitter(0))
        .update()
        .unwrap();

    assert_eq!(model.temperature().unwrap(), 220);
    assert_eq!(model.airflow().unwrap(), 200);
    assert!(!model.filter_dirty().unwrap());
}

#[test]
fn test_high_speed_readings() {
    let model = model_with_state(FanState::High);
    SensorSimulator::with_jitter(model.clone(), FixedJitter(0))
        .update()
        .unwrap();

    assert_eq!(model.temperature().unwrap(), 215);
    assert_eq!(model.airflow().unwrap(), 350);
}

#[test]
fn test_temperature_clamps() {
    let model = model_with_state(FanState::Off);
    SensorSimulator::with_jitter(model.clone(), FixedJitter(1000))
        .update()
        .unwrap();
    assert_eq!(model.temperature().unwrap(), 300);

    let model = model_with_state(FanState::High);
    SensorSimulator::with_jitter(model.clone(), FixedJitter(-1000))
        .update()
        .unwrap();
    assert_eq!(model.temperature().unwrap(), 150);
}

#[test]
fn test_jitter_draw_order() {
    let model = model_with_state(FanState::Low);
    let mut sensors =
        SensorSimulator::with_jitter(model.clone(), SequenceJitter::new(vec![2, -10, 5]));

    let readings = sensors.update().unwrap().unwrap();
    assert_eq!(readings.temperature, 222);
    assert_eq!(readings.humidity, 490);
    assert_eq!(readings.airflow, 205);
}

#[test]
fn test_dirty_filter_when_running_with_low_airflow() {
    let model = model_with_state(FanState::Low);
    let mut sensors =
        SensorSimulator::with_jitter(model.clone(), SequenceJitter::new(vec![0, 0, -300]));

    let readings = sensors.update().unwrap().unwrap();
    assert_eq!(readings.airflow, 0);
    assert!(readings.filter_dirty);
    assert!(model.filter_dirty().unwrap());
}

#[test]
fn test_no_dirty_filter_when_fan_off() {
    let model = model_with_state(FanState::Off);
    model.set_filter_dirty(true).unwrap();

    SensorSimulator::with_jitter(model.clone(), FixedJitter(0))
        .update()
        .unwrap();
    assert_eq!(model.airflow().unwrap(), 0);
    assert!(!model.filter_dirty().unwrap());
}

#[test]
fn test_simulation_disabled_leaves_registers_untouched() {
    let model = model_with_state(FanState::High);
    model.set_temperature(111).unwrap();
    model.set_humidity(222).unwrap();
    model.set_airflow(33).unwrap();
    model.set_filter_dirty(true).unwrap();
    model.set_sim_enabled(false).unwrap();

    let mut sensors = SensorSimulator::with_jitter(model.clone(), FixedJitter(0));
    assert_eq!(sensors.update().unwrap(), None);

    assert_eq!(model.temperature().unwrap(), 111);
    assert_eq!(model.humidity().unwrap(), 222);
    assert_eq!(model.airflow().unwrap(), 33);
    assert!(model.filter_dirty().unwrap());
}

#[test]
fn test_random_readings_within_bounds() {
    let model = model_with_state(FanState::High);
    let mut sensors = SensorSimulator::new(model);

    for _ in 0..200 {
        let r = sensors.update().unwrap().unwrap();
        assert!((213..=217).contains(&r.temperature), "{:?}", r);
        assert!((490..=510).contains(&r.humidity), "{:?}", r);
        assert!((345..=355).contains(&r.airflow), "{:?}", r);
        assert!(!r.filter_dirty);
    }
}
