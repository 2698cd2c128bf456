#[path = "../bin_common.rs"]
mod common;

use clap::{Parser, Subcommand};
use common::{ConnectionArgs, init_tracing, print_snapshot};
use eg4_modbus::{Eg4Error, SETTINGS, find_setting};

#[derive(Parser)]
#[command(name = "eg4-query")]
#[command(about = "One-shot reads and register writes against an EG4 inverter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll every block once and print all fields
    Read {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Write a raw value to one holding register
    Write {
        /// Holding register address
        address: u16,
        /// Raw 16-bit value
        value: u16,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Change a setting by name, in engineering units or by option label
    Set {
        /// Setting key, see `settings`
        key: String,
        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// List the writable settings
    Settings,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    match Cli::parse().command {
        Command::Read { connection } => {
            let hub = connection.hub();
            let snapshot = hub.poll().await;
            hub.close().await;
            if snapshot.updated_at.is_none() {
                return Err(format!("No data could be read from {}", hub.name()).into());
            }
            print_snapshot(&snapshot);
        }
        Command::Write {
            address,
            value,
            connection,
        } => {
            let hub = connection.hub();
            let wrote = hub.write_register(address, value).await;
            hub.close().await;
            if !wrote {
                return Err(format!("Write of {} to register {} failed", value, address).into());
            }
            println!("Wrote {} (0x{:04X}) to register {}", value, value, address);
        }
        Command::Set {
            key,
            value,
            connection,
        } => {
            let setting =
                find_setting(&key).ok_or_else(|| Eg4Error::UnknownSetting(key.clone()))?;
            let raw = setting.parse_raw(&value)?;

            let hub = connection.hub();
            if !hub.write_register(setting.address, raw).await {
                hub.close().await;
                return Err(format!("Write of {} to {} failed", value, setting.key).into());
            }

            let snapshot = hub.poll().await;
            hub.close().await;
            match snapshot.get(setting.key) {
                Some(current) => println!("{} = {}", setting.key, current),
                None => println!("{} written, read back unavailable", setting.key),
            }
        }
        Command::Settings => {
            for setting in SETTINGS {
                println!("{}", setting);
            }
        }
    }

    Ok(())
}
