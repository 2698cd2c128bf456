//! Aggregate values computed from the raw fields after each successful poll.

use crate::snapshot::{Snapshot, Value};

/// Strings reporting at or below this voltage are treated as disconnected.
pub const PV_VOLTAGE_THRESHOLD: f64 = 25.0;

const PV_POWER: [&str; 3] = ["power_pv1", "power_pv2", "power_pv3"];
const PV_VOLTAGE: [&str; 3] = ["voltage_pv1", "voltage_pv2", "voltage_pv3"];
const PV_ENERGY_DAILY: [&str; 3] = ["energy_daily_pv1", "energy_daily_pv2", "energy_daily_pv3"];
const PV_ENERGY_CUMULATIVE: [&str; 3] = [
    "energy_cumulative_pv1",
    "energy_cumulative_pv2",
    "energy_cumulative_pv3",
];

pub const TOTAL_PV_POWER: &str = "total_pv_power";
pub const AVERAGE_PV_VOLTAGE: &str = "average_pv_voltage";
pub const NET_BATTERY_POWER: &str = "net_battery_power";
pub const DAILY_PV_ENERGY_TOTAL: &str = "daily_pv_energy_total";
pub const CUMULATIVE_PV_ENERGY_TOTAL: &str = "cumulative_pv_energy_total";
pub const NET_GRID_POWER: &str = "net_grid_power";

/// Mean of the readings above `threshold`, 0 if none qualify.
pub fn average_above(values: &[f64], threshold: f64) -> f64 {
    let live: Vec<f64> = values.iter().copied().filter(|v| *v > threshold).collect();
    if live.is_empty() {
        0.0
    } else {
        live.iter().sum::<f64>() / live.len() as f64
    }
}

fn sum(snapshot: &Snapshot, keys: &[&str]) -> f64 {
    keys.iter().map(|key| snapshot.number(key)).sum()
}

/// Recompute every aggregate from the fields currently in `snapshot`.
pub fn recompute(snapshot: &mut Snapshot) {
    let voltages: Vec<f64> = PV_VOLTAGE.iter().map(|key| snapshot.number(key)).collect();

    let derived = [
        (TOTAL_PV_POWER, sum(snapshot, &PV_POWER)),
        (
            AVERAGE_PV_VOLTAGE,
            average_above(&voltages, PV_VOLTAGE_THRESHOLD),
        ),
        (
            NET_BATTERY_POWER,
            snapshot.number("power_battery_charge") - snapshot.number("power_battery_discharge"),
        ),
        (DAILY_PV_ENERGY_TOTAL, sum(snapshot, &PV_ENERGY_DAILY)),
        (
            CUMULATIVE_PV_ENERGY_TOTAL,
            sum(snapshot, &PV_ENERGY_CUMULATIVE),
        ),
        (
            NET_GRID_POWER,
            snapshot.number("power_grid_import") - snapshot.number("power_grid_export"),
        ),
    ];

    for (key, value) in derived {
        snapshot.insert(key, Value::Number(value));
    }
}
