#![allow(dead_code)]

use eg4_modbus::{Eg4Error, RegisterKind, Result, Transport};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Scripted answer to a block read.
#[derive(Debug, Clone)]
pub enum Reply {
    Words(Vec<u16>),
    Exception(u8),
    /// The link drops while the request is in flight.
    Disconnect,
    /// No answer at all; only a timeout ends the request.
    Hang,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Read(RegisterKind, u16),
    Write(u16),
}

/// Wall-clock interval during which one wire operation was in flight.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub op: OpKind,
    pub start: Instant,
    pub end: Instant,
}

#[derive(Default)]
struct State {
    connected: bool,
    refuse_connect: bool,
    connect_limit: Option<usize>,
    connects: usize,
    replies: HashMap<(RegisterKind, u16), Reply>,
    write_exception: Option<u8>,
    op_delay: Duration,
    spans: Vec<Span>,
    writes: Vec<(u16, u16)>,
}

/// In-memory transport. Clones share state, so a test keeps one handle
/// while the hub owns the other.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_reply(&self, kind: RegisterKind, start: u16, reply: Reply) {
        self.state().replies.insert((kind, start), reply);
    }

    pub fn set_words(&self, kind: RegisterKind, start: u16, words: Vec<u16>) {
        self.set_reply(kind, start, Reply::Words(words));
    }

    pub fn refuse_connect(&self, refuse: bool) {
        self.state().refuse_connect = refuse;
    }

    /// Accept the first `limit` connects and refuse every later one.
    pub fn refuse_connect_after(&self, limit: usize) {
        self.state().connect_limit = Some(limit);
    }

    pub fn fail_writes_with(&self, exception: Option<u8>) {
        self.state().write_exception = exception;
    }

    pub fn set_op_delay(&self, delay: Duration) {
        self.state().op_delay = delay;
    }

    pub fn connected(&self) -> bool {
        self.state().connected
    }

    pub fn connects(&self) -> usize {
        self.state().connects
    }

    pub fn spans(&self) -> Vec<Span> {
        self.state().spans.clone()
    }

    pub fn reads(&self) -> Vec<(RegisterKind, u16)> {
        self.state()
            .spans
            .iter()
            .filter_map(|span| match span.op {
                OpKind::Read(kind, start) => Some((kind, start)),
                OpKind::Write(_) => None,
            })
            .collect()
    }

    pub fn writes(&self) -> Vec<(u16, u16)> {
        self.state().writes.clone()
    }

    fn begin(&self) -> Result<(Instant, Duration)> {
        let state = self.state();
        if !state.connected {
            return Err(Eg4Error::NotConnected);
        }
        Ok((Instant::now(), state.op_delay))
    }

    fn record(&self, op: OpKind, start: Instant) {
        self.state().spans.push(Span {
            op,
            start,
            end: Instant::now(),
        });
    }

    async fn read(&mut self, kind: RegisterKind, start: u16, count: u16) -> Result<Vec<u16>> {
        let (began, delay) = self.begin()?;
        tokio::time::sleep(delay).await;

        let reply = self
            .state()
            .replies
            .get(&(kind, start))
            .cloned()
            .unwrap_or_else(|| Reply::Words(vec![0; count as usize]));

        let result = match reply {
            Reply::Words(words) => Ok(words),
            Reply::Exception(code) => Err(Eg4Error::from_exception_code(code)),
            Reply::Disconnect => {
                self.state().connected = false;
                Err(Eg4Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "connection reset by peer",
                )))
            }
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(Eg4Error::NotConnected)
            }
        };

        self.record(OpKind::Read(kind, start), began);
        result
    }
}

impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<()> {
        let mut state = self.state();
        state.connects += 1;
        let over_limit = state.connect_limit.is_some_and(|limit| state.connects > limit);
        if state.refuse_connect || over_limit {
            return Err(Eg4Error::ConnectionFailure("connection refused".to_string()));
        }
        state.connected = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.state().connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state().connected
    }

    async fn read_input_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>> {
        self.read(RegisterKind::Input, start, count).await
    }

    async fn read_holding_registers(&mut self, start: u16, count: u16) -> Result<Vec<u16>> {
        self.read(RegisterKind::Holding, start, count).await
    }

    async fn write_register(&mut self, address: u16, value: u16) -> Result<()> {
        let (began, delay) = self.begin()?;
        tokio::time::sleep(delay).await;

        let exception = self.state().write_exception;
        let result = match exception {
            Some(code) => Err(Eg4Error::from_exception_code(code)),
            None => {
                self.state().writes.push((address, value));
                Ok(())
            }
        };

        self.record(OpKind::Write(address), began);
        result
    }
}

/// Wait until at least `count` block reads have completed.
pub async fn reads_completed(transport: &MockTransport, count: usize) {
    while transport.reads().len() < count {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Spans sorted by start, asserting no two of them overlap.
pub fn assert_serialized(mut spans: Vec<Span>) {
    spans.sort_by_key(|span| span.start);
    for pair in spans.windows(2) {
        assert!(
            pair[0].end <= pair[1].start,
            "{:?} overlaps {:?}",
            pair[0].op,
            pair[1].op
        );
    }
}
