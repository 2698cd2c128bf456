#[path = "../bin_common.rs"]
mod common;

use clap::Parser;
use common::{ConnectionArgs, init_tracing};
use eg4_modbus::Snapshot;
use eg4_modbus::derived::{NET_BATTERY_POWER, NET_GRID_POWER, TOTAL_PV_POWER};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "eg4-monitor")]
#[command(about = "Continuously poll an EG4 inverter over Modbus")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Polling interval in seconds (minimum 1)
    #[arg(long, default_value_t = 10)]
    interval_secs: u64,

    /// Print every published snapshot as one JSON line
    #[arg(long)]
    json: bool,
}

fn summarize(snapshot: &Snapshot) {
    tracing::info!(
        generation = snapshot.generation,
        "PV {:.0} W  battery {:+.0} W  SOC {}%  grid {:+.0} W  state {}",
        snapshot.number(TOTAL_PV_POWER),
        snapshot.number(NET_BATTERY_POWER),
        snapshot.number("battery_soc"),
        snapshot.number(NET_GRID_POWER),
        snapshot
            .get("inverter_state")
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown".to_string()),
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let interval = Duration::from_secs(cli.interval_secs.max(1));
    let hub = cli.connection.hub();

    let cancel = CancellationToken::new();

    let cancel_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal");
        cancel_signal.cancel();
    });

    let mut updates = hub.subscribe();
    let json = cli.json;
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if json {
                match serde_json::to_string(snapshot.as_ref()) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::error!("Failed to serialize snapshot: {}", e),
                }
            } else {
                summarize(&snapshot);
            }
        }
    });

    tracing::info!("Monitoring {} every {:?}", hub.name(), interval);
    hub.run(interval, cancel).await;

    // Dropping the hub drops the sender, which ends the printer's loop.
    drop(hub);
    printer.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
