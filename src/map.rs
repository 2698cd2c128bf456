//! EG4 hybrid inverter register layout, read in this order every cycle.

use crate::alarm::{AC_INPUT_TYPE_CODES, FAULT_CODES, INVERTER_STATUS_CODES, WARNING_CODES};
use crate::registers::{BitField, BlockSpec, Op, RegisterKind, Scale, i16, u16, u32};

use Scale::{Hundredth, Tenth, Thousandth, Unit};

const INPUT_0: &[Op] = &[
    Op::Code {
        key: "inverter_state",
        mask: 0xFFFF,
        table: INVERTER_STATUS_CODES,
    },
    u16("voltage_pv1", Tenth),
    u16("voltage_pv2", Tenth),
    u16("voltage_pv3", Tenth),
    u16("voltage_battery", Tenth),
    Op::Packed(&[
        BitField::new("battery_soc", 0, 0xFF),
        BitField::new("battery_soh", 8, 0xFF),
    ]),
    Op::Skip(1),
    u16("power_pv1", Unit),
    u16("power_pv2", Unit),
    u16("power_pv3", Unit),
    u16("power_battery_charge", Unit),
    u16("power_battery_discharge", Unit),
    u16("voltage_grid_l1l2", Tenth),
    u16("voltage_grid_l2l3", Tenth),
    u16("voltage_grid_l3l1", Tenth),
    u16("frequency_grid", Hundredth),
    u16("power_inverter_output", Unit),
    u16("power_ac_charge", Unit),
    u16("current_inverter_rms", Hundredth),
    u16("power_factor_inverter", Thousandth),
    u16("voltage_inverter_l1l2", Tenth),
    u16("voltage_inverter_l2l3", Tenth),
    u16("voltage_inverter_l3l1", Tenth),
    u16("frequency_inverter", Hundredth),
    u16("power_inverter", Unit),
    u16("power_apparent_inverter", Unit),
    u16("power_grid_export", Unit),
    u16("power_grid_import", Unit),
    u16("energy_daily_pv1", Tenth),
    u16("energy_daily_pv2", Tenth),
    u16("energy_daily_pv3", Tenth),
    u16("energy_daily_inverter_output", Tenth),
    u16("energy_daily_ac_charge", Tenth),
    u16("energy_daily_battery_charge", Tenth),
    u16("energy_daily_battery_discharge", Tenth),
    u16("energy_daily_inverter", Tenth),
    u16("energy_daily_grid_export", Tenth),
    u16("energy_daily_grid_import", Tenth),
    u16("voltage_bus_1", Tenth),
    u16("voltage_bus_2", Tenth),
];

const INPUT_40: &[Op] = &[
    u32("energy_cumulative_pv1", Tenth),
    u32("energy_cumulative_pv2", Tenth),
    u32("energy_cumulative_pv3", Tenth),
    u32("energy_cumulative_inverter_output", Tenth),
    u32("energy_cumulative_ac_charge", Tenth),
    u32("energy_cumulative_battery_charge", Tenth),
    u32("energy_cumulative_battery_discharge", Tenth),
    u32("energy_cumulative_inverter", Tenth),
    u32("energy_cumulative_grid_export", Tenth),
    u32("energy_cumulative_grid_import", Tenth),
    Op::Bitmask {
        key: "fault_code",
        table: FAULT_CODES,
    },
    Op::Bitmask {
        key: "warning_code",
        table: WARNING_CODES,
    },
    i16("temperature_internal", Unit),
    i16("temperature_heatsink_dc", Unit),
    i16("temperature_heatsink_ac", Unit),
    i16("temperature_battery", Unit),
    Op::Skip(1),
    Op::RunningSince {
        key: "inverter_on_time",
    },
    Op::Packed(&[BitField::new("auto_test_status", 4, 0x0F)]),
    Op::Skip(5),
    Op::Code {
        key: "ac_input_type",
        mask: 0x0001,
        table: AC_INPUT_TYPE_CODES,
    },
    Op::Skip(2),
];

const INPUT_80: &[Op] = &[
    Op::Skip(1),
    u16("bms_current_max_charge", Hundredth),
    u16("bms_current_max_discharge", Hundredth),
    u16("bms_voltage_charge_ref", Tenth),
    u16("bms_voltage_discharge_cutoff", Tenth),
    u16("bms_status_0", Unit),
    u16("bms_status_1", Unit),
    u16("bms_status_2", Unit),
    u16("bms_status_3", Unit),
    u16("bms_status_4", Unit),
    u16("bms_status_5", Unit),
    u16("bms_status_6", Unit),
    u16("bms_status_7", Unit),
    u16("bms_status_8", Unit),
    u16("bms_status_9", Unit),
    u16("bms_status_inv", Unit),
    u16("battery_parallel_num", Unit),
    u16("battery_capacity_ah", Unit),
    i16("bms_current_battery", Tenth),
    u16("bms_fault_code", Unit),
    u16("bms_warning_code", Unit),
    u16("bms_voltage_max_cell", Thousandth),
    u16("bms_voltage_min_cell", Thousandth),
    i16("bms_temperature_max_cell", Tenth),
    i16("bms_temperature_min_cell", Tenth),
    u16("bms_fw_update_state", Unit),
    u16("bms_cycle_count", Unit),
    u16("voltage_battery_sample_inverter", Tenth),
    i16("temperature_t1", Tenth),
    i16("temperature_t2", Tenth),
    i16("temperature_t3", Tenth),
    i16("temperature_t4", Tenth),
    i16("temperature_t5", Tenth),
    Op::Packed(&[
        BitField::new("parallel_master_slave", 0, 0x03),
        BitField::new("parallel_phase", 2, 0x03),
        BitField::new("parallel_number", 8, 0xFF),
    ]),
    Op::Skip(6),
];

const INPUT_120: &[Op] = &[
    u16("voltage_bus_p", Tenth),
    u16("voltage_generator", Tenth),
    u16("frequency_generator", Hundredth),
    u16("power_generator", Unit),
    u16("energy_daily_generator", Tenth),
    u32("energy_cumulative_generator", Tenth),
    u16("voltage_inverter_l1n", Tenth),
    u16("voltage_inverter_l2n", Tenth),
    u16("power_inverter_l1n", Unit),
    u16("power_inverter_l2n", Unit),
    u16("power_apparent_inverter_l1n", Unit),
    u16("power_apparent_inverter_l2n", Unit),
    u16("energy_daily_inverter_l1n", Tenth),
    u16("energy_daily_inverter_l2n", Tenth),
    u32("energy_cumulative_inverter_l1n", Tenth),
    u32("energy_cumulative_inverter_l2n", Tenth),
    Op::Skip(1),
    u16("current_afci_ch1", Tenth),
    u16("current_afci_ch2", Tenth),
    u16("current_afci_ch3", Tenth),
    u16("current_afci_ch4", Tenth),
    Op::Flags(&[
        ("afci_alarm_ch1", 0),
        ("afci_alarm_ch2", 1),
        ("afci_alarm_ch3", 2),
        ("afci_alarm_ch4", 3),
        ("afci_selftest_ch1", 4),
        ("afci_selftest_ch2", 5),
        ("afci_selftest_ch3", 6),
        ("afci_selftest_ch4", 7),
    ]),
    u16("afci_arc_ch1", Unit),
    u16("afci_arc_ch2", Unit),
    u16("afci_arc_ch3", Unit),
    u16("afci_arc_ch4", Unit),
    u16("afci_max_arc_ch1", Unit),
    u16("afci_max_arc_ch2", Unit),
    u16("afci_max_arc_ch3", Unit),
    u16("afci_max_arc_ch4", Unit),
];

const HOLDING_9: &[Op] = &[
    Op::Packed(&[BitField::new("info_com_version", 8, 0xFF)]),
    Op::Packed(&[BitField::new("info_controller_version", 0, 0xFF)]),
    Op::Skip(1),
    Op::ClockCheck {
        key: "inverter_time_accurate",
        tolerance_secs: 30,
    },
    u16("setting_address_communication", Unit),
    u16("setting_language", Unit),
    Op::Skip(3),
    u16("setting_pv_input_model", Unit),
    Op::Skip(1),
    u16("setting_voltage_pv_start", Tenth),
    u16("setting_time_grid_connection_wait", Unit),
    u16("setting_time_reconnection_wait", Unit),
];

const HOLDING_64: &[Op] = &[
    u16("setting_percent_charge_power", Unit),
    u16("setting_percent_discharge_power", Unit),
    u16("setting_percent_ac_charge_power", Unit),
    u16("setting_limit_soc_ac_charge", Unit),
    Op::Skip(22),
    u16("setting_voltage_inverter", Unit),
    u16("setting_frequency_inverter", Unit),
    Op::Skip(7),
    u16("setting_voltage_charge_ref", Tenth),
    u16("setting_voltage_discharge_cutoff", Tenth),
    u16("setting_current_charge", Tenth),
    u16("setting_current_discharge", Tenth),
    u16("setting_max_backflow_power", Unit),
    Op::Skip(1),
    u16("setting_eod_soc", Unit),
    i16("setting_temp_low_limit_discharge", Tenth),
    i16("setting_temp_high_limit_discharge", Tenth),
    i16("setting_temp_low_limit_charge", Tenth),
    i16("setting_temp_high_limit_charge", Tenth),
    Op::Skip(2),
    u16("setting_system_type", Unit),
    u16("setting_composed_phase", Unit),
    Op::Skip(2),
    u16("setting_ptouser_start_discharge", Unit),
    Op::Skip(1),
    u16("setting_voltage_start_derating", Tenth),
    i16("setting_power_offset_wct", Unit),
];

const HOLDING_125: &[Op] = &[u16("setting_soc_low_limit_inverter_discharge", Unit)];

const HOLDING_144: &[Op] = &[
    u16("setting_voltage_float_charge", Tenth),
    u16("setting_output_priority_config", Unit),
    u16("setting_line_mode", Unit),
    u16("setting_battery_capacity", Unit),
    u16("setting_battery_nominal_voltage", Tenth),
    u16("setting_voltage_equalization", Tenth),
    u16("setting_equalization_interval", Unit),
    u16("setting_equalization_time", Unit),
];

const HOLDING_158: &[Op] = &[
    u16("setting_voltage_ac_charge_start", Tenth),
    u16("setting_voltage_ac_charge_end", Tenth),
    u16("setting_soc_ac_charge_start", Unit),
    u16("setting_soc_ac_charge_end", Unit),
    u16("setting_voltage_battery_low", Tenth),
    u16("setting_voltage_battery_low_back", Tenth),
    u16("setting_soc_battery_low", Unit),
    u16("setting_soc_battery_low_back", Unit),
    u16("setting_voltage_battery_low_to_utility", Tenth),
    u16("setting_soc_battery_low_to_utility", Unit),
    u16("setting_current_ac_charge_battery", Tenth),
    u16("setting_voltage_ongrid_eod", Tenth),
];

const HOLDING_176: &[Op] = &[
    u16("setting_power_max_grid_input", Unit),
    u16("setting_power_gen_rated", Unit),
];

const HOLDING_194: &[Op] = &[
    u16("setting_voltage_gen_charge_start", Tenth),
    u16("setting_voltage_gen_charge_end", Tenth),
    u16("setting_soc_gen_charge_start", Unit),
    u16("setting_soc_gen_charge_end", Unit),
    u16("setting_current_max_gen_charge_battery", Tenth),
];

const fn block(
    name: &'static str,
    kind: RegisterKind,
    start: u16,
    count: u16,
    program: &'static [Op],
) -> BlockSpec {
    BlockSpec {
        name,
        kind,
        start,
        count,
        program,
    }
}

pub static EG4_BLOCKS: &[BlockSpec] = &[
    block("input 0-39", RegisterKind::Input, 0, 40, INPUT_0),
    block("input 40-79", RegisterKind::Input, 40, 40, INPUT_40),
    block("input 80-119", RegisterKind::Input, 80, 40, INPUT_80),
    block("input 120-152", RegisterKind::Input, 120, 33, INPUT_120),
    block("holding 9-24", RegisterKind::Holding, 9, 16, HOLDING_9),
    block("holding 64-119", RegisterKind::Holding, 64, 56, HOLDING_64),
    block("holding 125", RegisterKind::Holding, 125, 1, HOLDING_125),
    block("holding 144-151", RegisterKind::Holding, 144, 8, HOLDING_144),
    block("holding 158-169", RegisterKind::Holding, 158, 12, HOLDING_158),
    block("holding 176-177", RegisterKind::Holding, 176, 2, HOLDING_176),
    block("holding 194-198", RegisterKind::Holding, 194, 5, HOLDING_194),
];
