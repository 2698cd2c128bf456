use crate::alarm::{lookup, translate};
use crate::decoder::RegisterDecoder;
use crate::error::Result;
use crate::snapshot::Value;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::warn;

/// Modbus register table a block is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterKind {
    /// Function code 0x04, read-only telemetry.
    Input,
    /// Function code 0x03, configuration.
    Holding,
}

impl RegisterKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            RegisterKind::Input => "input",
            RegisterKind::Holding => "holding",
        }
    }
}

/// Fixed decimal scaling of a raw register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Unit,
    Tenth,
    Hundredth,
    Thousandth,
}

impl Scale {
    pub const fn divisor(self) -> f64 {
        match self {
            Scale::Unit => 1.0,
            Scale::Tenth => 10.0,
            Scale::Hundredth => 100.0,
            Scale::Thousandth => 1000.0,
        }
    }

    pub fn factor(self) -> f64 {
        1.0 / self.divisor()
    }

    /// Unscaled registers stay integers; scaled ones become floats.
    pub fn apply(self, raw: i64) -> Value {
        match self {
            Scale::Unit => Value::Integer(raw),
            _ => Value::Number(raw as f64 / self.divisor()),
        }
    }
}

/// A small integer packed inside a register: `(raw >> shift) & mask`.
#[derive(Debug, Clone, Copy)]
pub struct BitField {
    pub key: &'static str,
    pub shift: u8,
    pub mask: u16,
}

impl BitField {
    pub const fn new(key: &'static str, shift: u8, mask: u16) -> Self {
        Self { key, shift, mask }
    }

    pub const fn extract(&self, raw: u16) -> u16 {
        (raw >> self.shift) & self.mask
    }
}

/// One step of a block's decode program.
#[derive(Debug, Clone, Copy)]
pub enum Op {
    U16 { key: &'static str, scale: Scale },
    I16 { key: &'static str, scale: Scale },
    U32 { key: &'static str, scale: Scale },
    I32 { key: &'static str, scale: Scale },
    Skip(usize),
    Code {
        key: &'static str,
        mask: u16,
        table: &'static [(u16, &'static str)],
    },
    Packed(&'static [BitField]),
    Flags(&'static [(&'static str, u8)]),
    Bitmask {
        key: &'static str,
        table: &'static [(u32, &'static str)],
    },
    /// Seconds-since-start counter, published as the start timestamp.
    RunningSince { key: &'static str },
    /// Three registers of packed `year, month | day, hour | minute, second`
    /// bytes compared against the wall clock.
    ClockCheck { key: &'static str, tolerance_secs: i64 },
}

impl Op {
    /// Number of registers this op consumes.
    pub const fn width(&self) -> usize {
        match self {
            Op::U16 { .. }
            | Op::I16 { .. }
            | Op::Code { .. }
            | Op::Packed(_)
            | Op::Flags(_) => 1,
            Op::U32 { .. } | Op::I32 { .. } | Op::Bitmask { .. } | Op::RunningSince { .. } => 2,
            Op::ClockCheck { .. } => 3,
            Op::Skip(n) => *n,
        }
    }
}

pub const fn u16(key: &'static str, scale: Scale) -> Op {
    Op::U16 { key, scale }
}

pub const fn i16(key: &'static str, scale: Scale) -> Op {
    Op::I16 { key, scale }
}

pub const fn u32(key: &'static str, scale: Scale) -> Op {
    Op::U32 { key, scale }
}

/// A contiguous register run read in one transaction, with its decode program.
#[derive(Debug, Clone, Copy)]
pub struct BlockSpec {
    pub name: &'static str,
    pub kind: RegisterKind,
    pub start: u16,
    pub count: u16,
    pub program: &'static [Op],
}

impl BlockSpec {
    /// Registers consumed by the program; equals `count` for a well formed block.
    pub fn program_width(&self) -> usize {
        self.program.iter().map(Op::width).sum()
    }

    /// Run the decode program over one response.
    ///
    /// Fields are staged and returned only if every op succeeds, so an
    /// underflow halfway through yields nothing from this block.
    pub fn decode(&self, words: &[u16], now: DateTime<Utc>) -> Result<Vec<(&'static str, Value)>> {
        let mut decoder = RegisterDecoder::new(words);
        let mut fields = Vec::with_capacity(self.program.len());

        for op in self.program {
            match *op {
                Op::U16 { key, scale } => {
                    fields.push((key, scale.apply(decoder.decode_u16()? as i64)));
                }
                Op::I16 { key, scale } => {
                    fields.push((key, scale.apply(decoder.decode_i16()? as i64)));
                }
                Op::U32 { key, scale } => {
                    fields.push((key, scale.apply(decoder.decode_u32()? as i64)));
                }
                Op::I32 { key, scale } => {
                    fields.push((key, scale.apply(decoder.decode_i32()? as i64)));
                }
                Op::Skip(count) => decoder.skip(count),
                Op::Code { key, mask, table } => {
                    let code = decoder.decode_u16()? & mask;
                    fields.push((key, Value::Text(lookup(code, table).to_string())));
                }
                Op::Packed(bitfields) => {
                    let raw = decoder.decode_u16()?;
                    for field in bitfields {
                        fields.push((field.key, Value::Integer(field.extract(raw) as i64)));
                    }
                }
                Op::Flags(flags) => {
                    let raw = decoder.decode_u16()?;
                    for &(key, bit) in flags {
                        fields.push((key, Value::Bool(raw & (1 << bit) != 0)));
                    }
                }
                Op::Bitmask { key, table } => {
                    let code = decoder.decode_u32()?;
                    fields.push((key, Value::Text(translate(code, table))));
                }
                Op::RunningSince { key } => {
                    let seconds = decoder.decode_u32()?;
                    let since = now - Duration::seconds(seconds as i64);
                    fields.push((key, Value::Timestamp(since)));
                }
                Op::ClockCheck {
                    key,
                    tolerance_secs,
                } => {
                    let packed = [
                        decoder.decode_u16()?,
                        decoder.decode_u16()?,
                        decoder.decode_u16()?,
                    ];
                    let accurate = match packed_time(packed) {
                        Some(device_time) => {
                            (now - device_time).abs() <= Duration::seconds(tolerance_secs)
                        }
                        None => {
                            warn!(block = self.name, raw = ?packed, "Invalid date components received from inverter");
                            false
                        }
                    };
                    fields.push((key, Value::Bool(accurate)));
                }
            }
        }

        Ok(fields)
    }
}

/// Device clock from three registers: low byte first in each register,
/// year offset from 2000.
pub fn packed_time(raw: [u16; 3]) -> Option<DateTime<Utc>> {
    let low = |word: u16| (word & 0xFF) as u32;
    let high = |word: u16| (word >> 8) as u32;

    let year = 2000 + low(raw[0]) as i32;
    NaiveDate::from_ymd_opt(year, high(raw[0]), low(raw[1]))?
        .and_hms_opt(high(raw[1]), low(raw[2]), high(raw[2]))
        .map(|naive| naive.and_utc())
}
