//! The polling hub: one connection, one lock, one published snapshot.

use crate::connection::{ConnectionManager, DEFAULT_TIMEOUT, SessionState};
use crate::derived;
use crate::registers::BlockSpec;
use crate::snapshot::Snapshot;
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Polls a fixed sequence of register blocks over one shared connection
/// and publishes the merged result.
///
/// Every wire operation, block read or register write, runs while holding
/// the same lock, so at most one request is ever in flight.
pub struct Hub<T> {
    name: String,
    blocks: &'static [BlockSpec],
    connection: Mutex<ConnectionManager<T>>,
    published: watch::Sender<Arc<Snapshot>>,
    clock: fn() -> DateTime<Utc>,
}

impl<T: Transport> Hub<T> {
    pub fn new(name: impl Into<String>, transport: T, blocks: &'static [BlockSpec]) -> Self {
        let (published, _) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            name: name.into(),
            blocks,
            connection: Mutex::new(ConnectionManager::new(transport, DEFAULT_TIMEOUT)),
            published,
            clock: Utc::now,
        }
    }

    /// Per-operation timeout for connects, reads and writes.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connection.get_mut().set_timeout(timeout);
        self
    }

    /// Wall clock used by time-dependent fields.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.published.borrow().clone()
    }

    /// Receiver notified on every publication.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.published.subscribe()
    }

    pub async fn session_state(&self) -> SessionState {
        self.connection.lock().await.state()
    }

    /// Run one poll cycle and return the snapshot that is current afterwards.
    ///
    /// A failed block keeps its previously published values. If no block
    /// succeeds the previous snapshot is returned untouched.
    pub async fn poll(&self) -> Arc<Snapshot> {
        // Read the base snapshot and publish the result under the lock, so a
        // cycle that waited merges over what the cycle before it published.
        let mut connection = self.connection.lock().await;

        let previous = self.snapshot();
        let mut working = Snapshot::clone(&previous);
        let now = (self.clock)();
        let mut succeeded = 0;
        let mut failed = 0;

        if !connection.ensure_connected().await {
            error!(hub = %self.name, "Modbus connection failed, keeping last known data");
            return previous;
        }

        for block in self.blocks {
            if !connection.ensure_connected().await {
                warn!(
                    hub = %self.name,
                    block = block.name,
                    "Connection lost, skipping remaining blocks"
                );
                break;
            }

            let fields = match connection.read_block(block).await {
                Ok(words) => block.decode(&words, now),
                Err(e) => Err(e),
            };

            match fields {
                Ok(fields) => {
                    working.extend(fields);
                    succeeded += 1;
                }
                Err(e) => {
                    warn!(
                        hub = %self.name,
                        block = block.name,
                        kind = block.kind.as_str(),
                        start = block.start,
                        count = block.count,
                        "Modbus read error: {}",
                        e
                    );
                    failed += 1;
                }
            }
        }

        if succeeded == 0 {
            warn!(hub = %self.name, "Modbus update failed to read any new data, returning last known values");
            return previous;
        }

        derived::recompute(&mut working);
        working.generation = previous.generation + 1;
        working.updated_at = Some(now);

        debug!(
            hub = %self.name,
            succeeded,
            failed,
            fields = working.len(),
            "Poll cycle complete"
        );

        let snapshot = Arc::new(working);
        self.published.send_replace(snapshot.clone());
        snapshot
    }

    /// Write one holding register. Errors are logged and reported as `false`.
    ///
    /// The snapshot is not touched; callers that want the new value visible
    /// before the next poll apply it themselves.
    pub async fn write_register(&self, address: u16, value: u16) -> bool {
        let mut connection = self.connection.lock().await;

        if !connection.ensure_connected().await {
            error!(hub = %self.name, address, "Client connection failed before write");
            return false;
        }

        match connection.write_register(address, value).await {
            Ok(()) => {
                info!(hub = %self.name, address, value, "Wrote holding register");
                true
            }
            Err(e) => {
                error!(
                    hub = %self.name,
                    address,
                    value,
                    "Error writing register: {}",
                    e
                );
                false
            }
        }
    }

    /// Close the connection. Safe to call repeatedly.
    pub async fn close(&self) {
        self.connection.lock().await.close().await;
    }

    /// Poll every `interval` until cancelled, then close the connection.
    ///
    /// Cycles never overlap: a slow cycle delays the next tick instead of
    /// running concurrently with it.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(hub = %self.name, "Starting poller (interval: {:?})", interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancel.cancelled() => {
                    info!(hub = %self.name, "Poller stopping");
                    break;
                }
            }

            self.poll().await;
        }

        self.close().await;
    }
}
