//! Test helpers for the transport module.

use std::io::Read;
use std::net::TcpStream;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::ConnectionHandler;

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: TcpStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Reads until the peer or the listener closes the connection.
pub(crate) struct HoldingHandler {
    finished: Arc<AtomicUsize>,
}

impl HoldingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let finished = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            finished: Arc::clone(&finished),
        });
        (finished, handler)
    }
}

impl ConnectionHandler for HoldingHandler {
    fn handle(&self, mut stream: TcpStream) {
        let mut sink = Vec::new();
        let _ = stream.read_to_end(&mut sink);
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}
