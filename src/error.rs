use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Eg4Error {
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Modbus exception: {0}")]
    ModbusException(ModbusExceptionCode),
    #[error("Modbus exception: unknown code {0:#04x}")]
    UnknownException(u8),
    #[error("Not enough registers to decode: at {position}, need {requested}, have {available}")]
    DecodeUnderflow {
        position: usize,
        requested: usize,
        available: usize,
    },
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid setting value: {0}")]
    InvalidSetting(String),
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),
}

impl Eg4Error {
    /// Errors after which the session can no longer be trusted and must be
    /// re-established before the next wire operation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Eg4Error::ConnectionFailure(_)
                | Eg4Error::NotConnected
                | Eg4Error::Timeout(_)
                | Eg4Error::Io(_)
        )
    }

    pub fn from_exception_code(code: u8) -> Self {
        match ModbusExceptionCode::from_u8(code) {
            Some(code) => Eg4Error::ModbusException(code),
            None => Eg4Error::UnknownException(code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModbusExceptionCode {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    SlaveDeviceFailure = 0x04,
    Acknowledge = 0x05,
    SlaveDeviceBusy = 0x06,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetDeviceFailedToRespond = 0x0B,
}

impl fmt::Display for ModbusExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ModbusExceptionCode::IllegalFunction => "Illegal function",
            ModbusExceptionCode::IllegalDataAddress => "Illegal data address",
            ModbusExceptionCode::IllegalDataValue => "Illegal data value",
            ModbusExceptionCode::SlaveDeviceFailure => "Slave device failure",
            ModbusExceptionCode::Acknowledge => "Acknowledge",
            ModbusExceptionCode::SlaveDeviceBusy => "Slave device busy",
            ModbusExceptionCode::MemoryParityError => "Memory parity error",
            ModbusExceptionCode::GatewayPathUnavailable => "Gateway path unavailable",
            ModbusExceptionCode::GatewayTargetDeviceFailedToRespond => {
                "Gateway target device failed to respond"
            }
        };
        write!(f, "{} ({:02X}h)", text, *self as u8)
    }
}

impl ModbusExceptionCode {
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(ModbusExceptionCode::IllegalFunction),
            0x02 => Some(ModbusExceptionCode::IllegalDataAddress),
            0x03 => Some(ModbusExceptionCode::IllegalDataValue),
            0x04 => Some(ModbusExceptionCode::SlaveDeviceFailure),
            0x05 => Some(ModbusExceptionCode::Acknowledge),
            0x06 => Some(ModbusExceptionCode::SlaveDeviceBusy),
            0x08 => Some(ModbusExceptionCode::MemoryParityError),
            0x0A => Some(ModbusExceptionCode::GatewayPathUnavailable),
            0x0B => Some(ModbusExceptionCode::GatewayTargetDeviceFailedToRespond),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Eg4Error>;
