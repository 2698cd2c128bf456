mod common;
use common::*;

use chrono::{DateTime, Duration, TimeZone, Utc};
use eg4_modbus::derived::*;
use eg4_modbus::{EG4_BLOCKS, Hub, RegisterKind, Value};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
}

fn close_to(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-6
}

/// An inverter charging from PV with a generator on the AC input.
fn scripted_inverter() -> MockTransport {
    let transport = MockTransport::new();

    let mut input_0 = vec![0u16; 40];
    input_0[0] = 0x0C;
    input_0[1] = 3500;
    input_0[2] = 2000;
    input_0[3] = 100;
    input_0[4] = 532;
    input_0[5] = (99 << 8) | 87;
    input_0[7] = 1500;
    input_0[8] = 900;
    input_0[10] = 400;
    input_0[15] = 5998;
    input_0[26] = 200;
    input_0[28] = 52;
    input_0[29] = 31;
    transport.set_words(RegisterKind::Input, 0, input_0);

    let mut input_40 = vec![0u16; 40];
    input_40[0] = 5;
    input_40[1] = 1;
    input_40[2] = 100;
    input_40[20] = 1 << 1;
    input_40[21] = 1;
    input_40[24] = (-3i16) as u16;
    input_40[29] = 3600;
    input_40[31] = 0x0020;
    input_40[37] = 1;
    transport.set_words(RegisterKind::Input, 40, input_40);

    let mut input_120 = vec![0u16; 33];
    input_120[24] = 0b0000_0101;
    transport.set_words(RegisterKind::Input, 120, input_120);

    let mut holding_9 = vec![0u16; 16];
    holding_9[0] = 0x0300;
    holding_9[1] = 0x0012;
    holding_9[3] = (5 << 8) | 24;
    holding_9[4] = (7 << 8) | 6;
    holding_9[5] = (9 << 8) | 8;
    holding_9[13] = 480;
    transport.set_words(RegisterKind::Holding, 9, holding_9);

    let mut holding_144 = vec![0u16; 8];
    holding_144[0] = 540;
    holding_144[2] = 1;
    transport.set_words(RegisterKind::Holding, 144, holding_144);

    transport
}

#[tokio::test]
async fn full_register_map_decodes() {
    let transport = scripted_inverter();
    let hub = Hub::new("eg4", transport.clone(), EG4_BLOCKS).with_clock(fixed_now);

    let snapshot = hub.poll().await;

    assert_eq!(transport.reads().len(), EG4_BLOCKS.len());
    assert_eq!(snapshot.generation, 1);

    let text = |key: &str| snapshot.get(key).map(ToString::to_string);
    assert_eq!(text("inverter_state").as_deref(), Some("PV Charge+on-grid mode"));
    assert_eq!(text("ac_input_type").as_deref(), Some("Generator"));
    assert_eq!(
        text("fault_code").as_deref(),
        Some("Model fault, Relay Check Fault")
    );
    assert_eq!(text("warning_code").as_deref(), Some("No Faults"));

    assert_eq!(snapshot.get("battery_soc"), Some(&Value::Integer(87)));
    assert_eq!(snapshot.get("battery_soh"), Some(&Value::Integer(99)));
    assert_eq!(snapshot.get("auto_test_status"), Some(&Value::Integer(2)));
    assert_eq!(snapshot.get("temperature_internal"), Some(&Value::Integer(-3)));
    assert!(close_to(snapshot.number("voltage_battery"), 53.2));
    assert!(close_to(snapshot.number("frequency_grid"), 59.98));
    assert!(close_to(snapshot.number("energy_cumulative_pv1"), 6554.1));

    assert_eq!(
        snapshot.get("inverter_on_time"),
        Some(&Value::Timestamp(fixed_now() - Duration::hours(1)))
    );
    assert_eq!(snapshot.get("inverter_time_accurate"), Some(&Value::Bool(true)));
    assert_eq!(snapshot.get("info_com_version"), Some(&Value::Integer(3)));
    assert_eq!(snapshot.get("info_controller_version"), Some(&Value::Integer(0x12)));

    assert_eq!(snapshot.get("afci_alarm_ch1"), Some(&Value::Bool(true)));
    assert_eq!(snapshot.get("afci_alarm_ch2"), Some(&Value::Bool(false)));
    assert_eq!(snapshot.get("afci_alarm_ch3"), Some(&Value::Bool(true)));

    assert!(close_to(snapshot.number("setting_voltage_pv_start"), 48.0));
    assert!(close_to(snapshot.number("setting_voltage_float_charge"), 54.0));
    assert_eq!(snapshot.get("setting_line_mode"), Some(&Value::Integer(1)));

    assert_eq!(snapshot.number(TOTAL_PV_POWER), 2400.0);
    assert!(close_to(snapshot.number(AVERAGE_PV_VOLTAGE), 275.0));
    assert_eq!(snapshot.number(NET_BATTERY_POWER), 400.0);
    assert!(close_to(snapshot.number(DAILY_PV_ENERGY_TOTAL), 8.3));
    assert!(close_to(snapshot.number(CUMULATIVE_PV_ENERGY_TOTAL), 6564.1));
    assert_eq!(snapshot.number(NET_GRID_POWER), -200.0);
}

#[tokio::test]
async fn drifting_or_invalid_device_clock_is_not_accurate() {
    let transport = scripted_inverter();

    let mut holding_9 = vec![0u16; 16];
    holding_9[3] = (5 << 8) | 24;
    holding_9[4] = (7 << 8) | 6;
    holding_9[5] = 8 + 1;
    transport.set_words(RegisterKind::Holding, 9, holding_9.clone());

    let hub = Hub::new("eg4", transport.clone(), EG4_BLOCKS).with_clock(fixed_now);
    let snapshot = hub.poll().await;
    assert_eq!(snapshot.get("inverter_time_accurate"), Some(&Value::Bool(false)));

    // month 13: the block still commits, the flag reads false
    holding_9[3] = (13 << 8) | 24;
    holding_9[13] = 900;
    transport.set_words(RegisterKind::Holding, 9, holding_9);
    let snapshot = hub.poll().await;
    assert_eq!(snapshot.get("inverter_time_accurate"), Some(&Value::Bool(false)));
    assert!(close_to(snapshot.number("setting_voltage_pv_start"), 90.0));
}

#[tokio::test]
async fn snapshot_serializes_to_flat_json() {
    let transport = scripted_inverter();
    let hub = Hub::new("eg4", transport, EG4_BLOCKS).with_clock(fixed_now);

    let snapshot = hub.poll().await;
    let json = serde_json::to_value(snapshot.as_ref()).unwrap();

    assert_eq!(json["generation"], 1);
    assert_eq!(json["updated_at"], "2024-05-06T07:08:09Z");
    assert_eq!(json["fields"]["inverter_state"], "PV Charge+on-grid mode");
    assert_eq!(json["fields"]["battery_soc"], 87);
    assert_eq!(json["fields"]["inverter_on_time"], "2024-05-06T06:08:09Z");
    assert_eq!(json["fields"]["inverter_time_accurate"], true);
}
