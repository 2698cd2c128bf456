use clap::Args;
use eg4_modbus::serial::DEFAULT_BAUD_RATE;
use eg4_modbus::tcp::DEFAULT_PORT;
use eg4_modbus::{AnyTransport, EG4_BLOCKS, Hub, SerialTransport, Snapshot, TcpTransport};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Where the inverter is attached. Exactly one must be given.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct LinkArgs {
    /// Modbus TCP host (e.g. an RS-485 to Ethernet bridge)
    #[arg(long)]
    pub host: Option<String>,

    /// Serial port path for Modbus RTU (e.g. /dev/ttyUSB0)
    #[arg(long)]
    pub serial: Option<String>,
}

#[derive(Args)]
pub struct ConnectionArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    /// Modbus TCP port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Serial baud rate
    #[arg(short = 'r', long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud_rate: u32,

    /// Modbus unit (slave) id of the inverter
    #[arg(short, long, default_value_t = 1)]
    pub unit_id: u8,

    /// Timeout for each connect, read and write, in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

impl ConnectionArgs {
    pub fn name(&self) -> String {
        match (&self.link.host, &self.link.serial) {
            (Some(host), _) => format!("{}:{}", host, self.port),
            (None, Some(path)) => path.clone(),
            (None, None) => unreachable!("clap requires --host or --serial"),
        }
    }

    pub fn transport(&self) -> AnyTransport {
        match (&self.link.host, &self.link.serial) {
            (Some(host), _) => TcpTransport::new(host.clone(), self.port, self.unit_id).into(),
            (None, Some(path)) => {
                SerialTransport::new(path.clone(), self.baud_rate, self.unit_id).into()
            }
            (None, None) => unreachable!("clap requires --host or --serial"),
        }
    }

    pub fn hub(&self) -> Hub<AnyTransport> {
        Hub::new(self.name(), self.transport(), EG4_BLOCKS)
            .with_timeout(Duration::from_secs(self.timeout_secs.max(1)))
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

#[allow(dead_code)]
pub fn print_snapshot(snapshot: &Snapshot) {
    println!("═══════════════════════════════════════════════════════════");
    match snapshot.updated_at {
        Some(at) => println!(
            "Snapshot #{}  updated {}",
            snapshot.generation,
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("No data"),
    }
    println!("═══════════════════════════════════════════════════════════");
    let width = snapshot.fields.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in &snapshot.fields {
        println!("  {:<width$}  {}", key, value, width = width);
    }
    println!();
}
