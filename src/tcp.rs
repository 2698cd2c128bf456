//! Modbus TCP transport on top of `tokio-modbus`.

use crate::error::{Eg4Error, Result};
use crate::transport::Transport;
use tokio_modbus::client::{Context, tcp};
use tokio_modbus::prelude::*;

pub const DEFAULT_PORT: u16 = 502;

/// Modbus TCP transport for inverters behind a dongle or gateway.
pub struct TcpTransport {
    host: String,
    port: u16,
    unit_id: u8,
    ctx: Option<Context>,
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("unit_id", &self.unit_id)
            .field("connected", &self.ctx.is_some())
            .finish()
    }
}

impl TcpTransport {
    /// Create an unconnected transport; the host is resolved on `connect`.
    pub fn new(host: impl Into<String>, port: u16, unit_id: u8) -> Self {
        Self {
            host: host.into(),
            port,
            unit_id,
            ctx: None,
        }
    }

    fn context(&mut self) -> Result<&mut Context> {
        self.ctx.as_mut().ok_or(Eg4Error::NotConnected)
    }
}

impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<()> {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.disconnect().await.ok();
        }

        let addr = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await?
            .next()
            .ok_or_else(|| {
                Eg4Error::ConnectionFailure(format!("{} did not resolve", self.host))
            })?;

        let ctx = tcp::connect_slave(addr, Slave(self.unit_id))
            .await
            .map_err(|e| Eg4Error::ConnectionFailure(format!("{}: {}", addr, e)))?;
        self.ctx = Some(ctx);
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

/// Split `tokio-modbus`'s nested result into transport and exception errors.
pub(crate) fn flatten<T>(result: tokio_modbus::Result<T>) -> Result<T> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(exception)) => Err(Eg4Error::from_exception_code(u8::from(exception))),
        Err(tokio_modbus::Error::Transport(e)) => Err(Eg4Error::Io(e)),
        Err(e) => Err(Eg4Error::ConnectionFailure(e.to_string())),
    }
}
