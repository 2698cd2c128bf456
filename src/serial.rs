//! Serial/RS-485 transport for Modbus RTU communication.
//!
//! This module provides a serial transport that implements the `Transport` trait,
//! using `tokio-modbus` for the underlying Modbus RTU communication.

use crate::error::{Eg4Error, Result};
use crate::tcp::flatten;
use crate::transport::Transport;
use tokio_modbus::client::{Context, rtu};
use tokio_modbus::prelude::*;
use tokio_serial::SerialPortBuilderExt;

/// Default baud rate of the EG4 RS-485 inverter port
pub const DEFAULT_BAUD_RATE: u32 = 19200;

/// Serial transport for Modbus RTU communication.
///
/// The port is opened on `connect` and released on `close`.
pub struct SerialTransport {
    path: String,
    baud_rate: u32,
    unit_id: u8,
    ctx: Option<Context>,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .field("unit_id", &self.unit_id)
            .finish_non_exhaustive()
    }
}

impl SerialTransport {
    /// Create a new serial transport.
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyUSB0" or "COM3")
    /// * `baud_rate` - Baud rate (19200 for EG4 inverters)
    /// * `unit_id` - Modbus slave address
    pub fn new(path: impl Into<String>, baud_rate: u32, unit_id: u8) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            unit_id,
            ctx: None,
        }
    }

    fn context(&mut self) -> Result<&mut Context> {
        self.ctx.as_mut().ok_or(Eg4Error::NotConnected)
    }
}

impl Transport for SerialTransport {
    async fn connect(&mut self) -> Result<()> {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.disconnect().await.ok();
        }

        let port = tokio_serial::new(&self.path, self.baud_rate)
            .open_native_async()
            .map_err(|e| Eg4Error::ConnectionFailure(format!("{}: {}", self.path, e)))?;

        self.ctx = Some(rtu::attach_slave(port, Slave(self.unit_id)));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        match self.ctx.take() {
            Some(mut ctx) => Ok(ctx.disconnect().await?),
            None => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        self.ctx.is_some()
    }

    async fn read_input_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>> {
        flatten(self.context()?.read_input_registers(start, count).await)
    }

    async fn read_holding_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>> {
        flatten(self.context()?.read_holding_registers(start, count).await)
    }

    async fn write_register(&mut self, address: u16, value: u16) -> Result<()> {
        flatten(self.context()?.write_single_register(address, value).await)
    }
}
