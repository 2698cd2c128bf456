use crate::error::Result;
use crate::serial::SerialTransport;
use crate::tcp::TcpTransport;
use crate::transport::Transport;

/// Either supported transport, chosen at runtime by the binaries.
#[derive(Debug)]
pub enum AnyTransport {
    Tcp(TcpTransport),
    Serial(SerialTransport),
}

impl Transport for AnyTransport {
    async fn connect(&mut self) -> Result<()> {
        match self {
            AnyTransport::Tcp(t) => t.connect().await,
            AnyTransport::Serial(t) => t.connect().await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            AnyTransport::Tcp(t) => t.close().await,
            AnyTransport::Serial(t) => t.close().await,
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            AnyTransport::Tcp(t) => t.is_connected(),
            AnyTransport::Serial(t) => t.is_connected(),
        }
    }

    async fn read_input_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>> {
        match self {
            AnyTransport::Tcp(t) => t.read_input_registers(start, count).await,
            AnyTransport::Serial(t) => t.read_input_registers(start, count).await,
        }
    }

    async fn read_holding_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>> {
        match self {
            AnyTransport::Tcp(t) => t.read_holding_registers(start, count).await,
            AnyTransport::Serial(t) => t.read_holding_registers(start, count).await,
        }
    }

    async fn write_register(&mut self, address: u16, value: u16) -> Result<()> {
        match self {
            AnyTransport::Tcp(t) => t.write_register(address, value).await,
            AnyTransport::Serial(t) => t.write_register(address, value).await,
        }
    }
}

impl From<TcpTransport> for AnyTransport {
    fn from(t: TcpTransport) -> Self {
        AnyTransport::Tcp(t)
    }
}

impl From<SerialTransport> for AnyTransport {
    fn from(t: SerialTransport) -> Self {
        AnyTransport::Serial(t)
    }
}
