use crate::error::Result;
use std::future::Future;

/// Register-level Modbus client the hub drives.
///
/// Implementations own the physical session (TCP socket, serial port, or a
/// test double). None of them serialize access; the hub does that.
pub trait Transport: Send {
    /// Open the session. Calling this while connected reopens it.
    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the session. Closing a closed session is not an error.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn is_connected(&self) -> bool;

    /// Function code 0x04.
    fn read_input_registers(
        &mut self,
        start: u16,
        count: u16,
    ) -> impl Future<Output = Result<Vec<u16>>> + Send;

    /// Function code 0x03.
    fn read_holding_registers(
        &mut self,
        start: u16,
        count: u16,
    ) -> impl Future<Output = Result<Vec<u16>>> + Send;

    /// Function code 0x06.
    fn write_register(&mut self, address: u16, value: u16) -> impl Future<Output = Result<()>> + Send;
}
