pub mod alarm;
pub mod any_transport;
pub mod connection;
pub mod decoder;
pub mod derived;
pub mod error;
pub mod hub;
pub mod map;
pub mod registers;
pub mod serial;
pub mod settings;
pub mod snapshot;
pub mod tcp;
pub mod transport;

pub use any_transport::AnyTransport;
pub use connection::{ConnectionManager, SessionState};
pub use decoder::RegisterDecoder;
pub use error::{Eg4Error, ModbusExceptionCode, Result};
pub use hub::Hub;
pub use map::EG4_BLOCKS;
pub use registers::{BlockSpec, Op, RegisterKind, Scale};
pub use serial::SerialTransport;
pub use settings::{SETTINGS, Setting, SettingKind, find_setting};
pub use snapshot::{Snapshot, Value};
pub use tcp::TcpTransport;
pub use transport::Transport;
