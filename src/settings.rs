//! Writable holding registers and conversion of user-facing values to raw
//! register words.

use crate::error::{Eg4Error, Result};
use crate::registers::Scale::{self, Tenth, Unit};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingKind {
    /// Numeric value in engineering units, stored as `value / scale`.
    Number { scale: Scale, min: f64, max: f64 },
    /// Enumerated value, stored as the option's index.
    Select { options: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setting {
    pub address: u16,
    pub key: &'static str,
    pub kind: SettingKind,
}

const fn number(address: u16, key: &'static str, scale: Scale, min: f64, max: f64) -> Setting {
    Setting {
        address,
        key,
        kind: SettingKind::Number { scale, min, max },
    }
}

const fn select(address: u16, key: &'static str, options: &'static [&'static str]) -> Setting {
    Setting {
        address,
        key,
        kind: SettingKind::Select { options },
    }
}

pub static SETTINGS: &[Setting] = &[
    select(16, "setting_language", &["English", "German"]),
    select(
        20,
        "setting_pv_input_model",
        &[
            "No PV",
            "PV1 in",
            "PV2 in",
            "PV3 in",
            "PV1&2 in",
            "PV1&3 in",
            "PV2&3 in",
            "PV1&2&3 in",
        ],
    ),
    number(22, "setting_voltage_pv_start", Tenth, 90.0, 500.0),
    number(23, "setting_time_grid_connection_wait", Unit, 30.0, 600.0),
    number(24, "setting_time_reconnection_wait", Unit, 0.0, 900.0),
    number(64, "setting_percent_charge_power", Unit, 0.0, 100.0),
    number(65, "setting_percent_discharge_power", Unit, 0.0, 100.0),
    number(66, "setting_percent_ac_charge_power", Unit, 0.0, 100.0),
    number(67, "setting_limit_soc_ac_charge", Unit, 0.0, 100.0),
    select(90, "setting_voltage_inverter", &["230", "240", "277", "208"]),
    select(91, "setting_frequency_inverter", &["50", "60"]),
    number(99, "setting_voltage_charge_ref", Tenth, 50.0, 59.0),
    number(100, "setting_voltage_discharge_cutoff", Tenth, 40.0, 50.0),
    number(101, "setting_current_charge", Tenth, 0.0, 140.0),
    number(102, "setting_current_discharge", Tenth, 0.0, 140.0),
    number(103, "setting_max_backflow_power", Unit, 0.0, 100.0),
    number(105, "setting_eod_soc", Unit, 10.0, 90.0),
    select(
        112,
        "setting_system_type",
        &[
            "No Parallel",
            "Single Phase Parallel (Master)",
            "Slave",
            "Three Phase Parallel (Master)",
        ],
    ),
    number(116, "setting_ptouser_start_discharge", Unit, 50.0, 10000.0),
    number(118, "setting_voltage_start_derating", Tenth, 0.0, 6553.5),
    number(119, "setting_power_offset_wct", Unit, -1000.0, 1000.0),
    number(125, "setting_soc_low_limit_inverter_discharge", Unit, 0.0, 100.0),
    number(144, "setting_voltage_float_charge", Tenth, 50.0, 56.0),
    select(
        145,
        "setting_output_priority_config",
        &["Battery First", "PV First", "AC First"],
    ),
    select(146, "setting_line_mode", &["APL", "UPS", "GEN"]),
    number(147, "setting_battery_capacity", Unit, 0.0, 10000.0),
    number(148, "setting_battery_nominal_voltage", Tenth, 40.0, 59.0),
    number(149, "setting_voltage_equalization", Tenth, 50.0, 59.0),
    number(150, "setting_equalization_interval", Unit, 0.0, 365.0),
    number(151, "setting_equalization_time", Unit, 0.0, 24.0),
    number(158, "setting_voltage_ac_charge_start", Tenth, 38.4, 52.0),
    number(159, "setting_voltage_ac_charge_end", Tenth, 48.0, 59.0),
    number(160, "setting_soc_ac_charge_start", Unit, 0.0, 90.0),
    number(161, "setting_soc_ac_charge_end", Unit, 20.0, 100.0),
    number(162, "setting_voltage_battery_low", Tenth, 40.0, 50.0),
    number(163, "setting_voltage_battery_low_back", Tenth, 42.0, 52.0),
    number(164, "setting_soc_battery_low", Unit, 0.0, 90.0),
    number(165, "setting_soc_battery_low_back", Unit, 20.0, 100.0),
    number(166, "setting_voltage_battery_low_to_utility", Tenth, 44.4, 51.4),
    number(167, "setting_soc_battery_low_to_utility", Unit, 0.0, 100.0),
    number(168, "setting_current_ac_charge_battery", Tenth, 0.0, 140.0),
    number(169, "setting_voltage_ongrid_eod", Tenth, 40.0, 56.0),
    number(176, "setting_power_max_grid_input", Unit, 0.0, 65535.0),
    number(177, "setting_power_gen_rated", Unit, 0.0, 65535.0),
    number(194, "setting_voltage_gen_charge_start", Tenth, 38.4, 52.0),
    number(195, "setting_voltage_gen_charge_end", Tenth, 48.0, 59.0),
    number(196, "setting_soc_gen_charge_start", Unit, 0.0, 90.0),
    number(197, "setting_soc_gen_charge_end", Unit, 20.0, 100.0),
    number(198, "setting_current_max_gen_charge_battery", Tenth, 0.0, 60.0),
];

pub fn find_setting(key: &str) -> Option<&'static Setting> {
    SETTINGS.iter().find(|s| s.key == key)
}

impl Setting {
    /// Raw register word for a numeric value.
    ///
    /// Negative values are stored as 16-bit two's complement.
    pub fn raw_from_value(&self, value: f64) -> Result<u16> {
        let SettingKind::Number { scale, min, max } = self.kind else {
            return Err(Eg4Error::InvalidSetting(format!(
                "{} takes one of: {}",
                self.key,
                self.options().join(", ")
            )));
        };

        if !value.is_finite() || value < min || value > max {
            return Err(Eg4Error::InvalidSetting(format!(
                "{} must be between {} and {}, got {}",
                self.key, min, max, value
            )));
        }

        let raw = (value * scale.divisor()).round() as i64;
        if raw < i16::MIN as i64 || raw > u16::MAX as i64 {
            return Err(Eg4Error::InvalidSetting(format!(
                "{} value {} does not fit in a register",
                self.key, value
            )));
        }
        Ok(raw as u16)
    }

    /// Raw register word for an enumerated option.
    pub fn raw_from_option(&self, option: &str) -> Result<u16> {
        let SettingKind::Select { options } = self.kind else {
            return Err(Eg4Error::InvalidSetting(format!(
                "{} is numeric, not a list of options",
                self.key
            )));
        };

        options
            .iter()
            .position(|o| o.eq_ignore_ascii_case(option))
            .map(|index| index as u16)
            .ok_or_else(|| {
                Eg4Error::InvalidSetting(format!(
                    "{} takes one of: {}, got {:?}",
                    self.key,
                    options.join(", "),
                    option
                ))
            })
    }

    /// Parse a command-line value into a raw register word.
    pub fn parse_raw(&self, input: &str) -> Result<u16> {
        match self.kind {
            SettingKind::Number { .. } => {
                let value: f64 = input.trim().parse().map_err(|_| {
                    Eg4Error::InvalidSetting(format!("{}: not a number: {:?}", self.key, input))
                })?;
                self.raw_from_value(value)
            }
            SettingKind::Select { .. } => self.raw_from_option(input.trim()),
        }
    }

    pub fn options(&self) -> &'static [&'static str] {
        match self.kind {
            SettingKind::Select { options } => options,
            SettingKind::Number { .. } => &[],
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}  {:<42}", self.address, self.key)?;
        match self.kind {
            SettingKind::Number { scale, min, max } => {
                write!(f, "{} .. {}", min, max)?;
                if scale != Scale::Unit {
                    write!(f, "  (x{})", scale.factor())?;
                }
                Ok(())
            }
            SettingKind::Select { options } => write!(f, "{}", options.join(" | ")),
        }
    }
}
