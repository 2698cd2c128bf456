use crate::error::{Eg4Error, Result};
use crate::registers::{BlockSpec, RegisterKind};
use crate::transport::Transport;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-operation timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
}

/// Owns the single transport session of a hub.
///
/// Not synchronized itself: the hub keeps it behind its one lock, so every
/// method here runs with exclusive access to the wire.
#[derive(Debug)]
pub struct ConnectionManager<T> {
    transport: T,
    timeout: Duration,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn state(&self) -> SessionState {
        if self.transport.is_connected() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Connect if needed. Failures are logged and reported as `false`.
    pub async fn ensure_connected(&mut self) -> bool {
        if self.transport.is_connected() {
            return true;
        }

        match tokio::time::timeout(self.timeout, self.transport.connect()).await {
            Ok(Ok(())) => {
                info!("Modbus session established");
                true
            }
            Ok(Err(e)) => {
                warn!("Modbus connection failed: {}", e);
                false
            }
            Err(_) => {
                warn!("Modbus connection timed out after {:?}", self.timeout);
                false
            }
        }
    }

    /// Close the session; a no-op when already closed.
    pub async fn close(&mut self) {
        if !self.transport.is_connected() {
            return;
        }
        if let Err(e) = self.transport.close().await {
            debug!("Error while closing Modbus session: {}", e);
        }
        debug!("Modbus session closed");
    }

    /// Read the raw words of one block.
    pub async fn read_block(&mut self, block: &BlockSpec) -> Result<Vec<u16>> {
        let (start, count) = (block.start, block.count);
        let timeout = self.timeout;
        let result = match block.kind {
            RegisterKind::Input => {
                with_timeout(timeout, self.transport.read_input_registers(start, count)).await
            }
            RegisterKind::Holding => {
                with_timeout(timeout, self.transport.read_holding_registers(start, count)).await
            }
        };
        self.check(result).await
    }

    pub async fn write_register(&mut self, address: u16, value: u16) -> Result<()> {
        let result = with_timeout(self.timeout, self.transport.write_register(address, value)).await;
        self.check(result).await
    }

    /// Drop the session after errors that leave it in an unknown state, so
    /// the next operation starts from a fresh connection.
    async fn check<V>(&mut self, result: Result<V>) -> Result<V> {
        if let Err(e) = &result {
            if e.is_fatal() {
                self.close().await;
            }
        }
        result
    }
}

async fn with_timeout<V>(timeout: Duration, fut: impl Future<Output = Result<V>>) -> Result<V> {
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(Eg4Error::Timeout(timeout)))
}
