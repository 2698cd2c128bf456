/// Inverter operating state, input register 0.
pub const INVERTER_STATUS_CODES: &[(u16, &str)] = &[
    (0x00, "Standby"),
    (0x01, "Fault"),
    (0x02, "Programming"),
    (0x04, "PV on-grid mode"),
    (0x08, "PV Charge mode"),
    (0x0C, "PV Charge+on-grid mode"),
    (0x10, "Battery on-grid mode"),
    (0x14, "PV+ Battery on-grid mode"),
    (0x20, "AC Charge mode"),
    (0x28, "PV+AC charge mode"),
    (0x40, "Battery off-grid mode"),
    (0x80, "PV off-grid mode"),
    (0x88, "PV charge +off-grid mode"),
    (0xC0, "PV+battery off-grid mode"),
];

pub const AC_INPUT_TYPE_CODES: &[(u16, &str)] = &[(0, "Grid"), (1, "Generator")];

pub const FAULT_CODES: &[(u32, &str)] = &[
    (1 << 0, "Internal communication fault 1"),
    (1 << 1, "Model fault"),
    (1 << 8, "Paralleling CAN communication lost"),
    (1 << 9, "Master unit lost in paralleling system"),
    (1 << 10, "Multiple master units in paralleling system"),
    (1 << 11, "AC input inconsistent in paralleling system"),
    (1 << 12, "UPS short"),
    (1 << 13, "Reverse current on UPS output"),
    (1 << 14, "BUS short"),
    (1 << 15, "Grid phases inconsistent in 3phase paralleling system"),
    (1 << 16, "Relay Check Fault"),
    (1 << 17, "Internal communication fault 2"),
    (1 << 18, "Internal communication fault 3"),
    (1 << 19, "BUS Voltage high"),
    (1 << 20, "EPS connection fault"),
    (1 << 21, "PV Voltage high"),
    (1 << 22, "Over current protection"),
    (1 << 23, "Neutral fault"),
    (1 << 24, "PV short"),
    (1 << 25, "Radiator temperature out of range"),
    (1 << 26, "Internal Fault"),
    (1 << 27, "Sample inconsistent between Main CPU and redundant CPU"),
    (1 << 31, "Internal communication fault 4"),
];

pub const WARNING_CODES: &[(u32, &str)] = &[
    (1 << 0, "Battery communication failure"),
    (1 << 1, "AFCI communication failure"),
    (1 << 2, "AFCI High"),
    (1 << 3, "Meter communication failure"),
    (1 << 4, "Both charge and discharge forbidden by battery"),
    (1 << 5, "Auto test failed"),
    (1 << 7, "LCD communication failure"),
    (1 << 8, "FW version mismatching"),
    (1 << 9, "Fan stuck"),
    (1 << 11, "Parallel number out of range"),
    (1 << 15, "Battery reverse connection"),
    (1 << 16, "Grid power outage"),
    (1 << 17, "Grid voltage out of range"),
    (1 << 18, "Grid frequency out of range"),
    (1 << 20, "PV insulation low"),
    (1 << 21, "Leakage current high"),
    (1 << 22, "DCI high"),
    (1 << 23, "PV short"),
    (1 << 25, "Battery voltage high"),
    (1 << 26, "Battery voltage low"),
    (1 << 27, "Battery open circuit"),
    (1 << 28, "EPS overload"),
    (1 << 29, "EPS voltage high"),
    (1 << 30, "Meter reverse connection"),
    (1 << 31, "DCV high"),
];

/// Turn a fault/warning bitmask into a comma separated list of messages,
/// in table order.
pub fn translate(code: u32, messages: &[(u32, &str)]) -> String {
    if code == 0 {
        return "No Faults".to_string();
    }

    let active: Vec<&str> = messages
        .iter()
        .filter(|(bit, _)| code & bit != 0)
        .map(|(_, message)| *message)
        .collect();

    if active.is_empty() {
        return format!("Unknown Code: {:#x}", code);
    }

    active.join(", ")
}

/// Label for an enumerated status code, `"Unknown"` if the table has no entry.
pub fn lookup(code: u16, labels: &[(u16, &'static str)]) -> &'static str {
    labels
        .iter()
        .find(|(value, _)| *value == code)
        .map(|(_, label)| *label)
        .unwrap_or("Unknown")
}
