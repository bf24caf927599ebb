//! Background threads that run a job at a fixed period.
//!
//! The land ticker, the liveness sweeper, and the heartbeat reporter all share
//! this shape: wait one period, run, repeat until told to stop. The stop
//! signal doubles as the sleep, so shutdown never waits out a full period.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

const PERIODIC_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::periodic");

/// Shortest period a task waits between runs.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a running periodic job.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawns a thread named `name` that calls `job` every `period`.
    ///
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    ///
    /// # Errors
    ///
    /// Returns the spawn error when the thread cannot be started.
    pub fn spawn<F>(name: &'static str, period: Duration, mut job: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new().name(name.to_owned()).spawn(move || {
            debug!(target: PERIODIC_TARGET, task = name, period_ms = period.as_millis(), "periodic task started");
            loop {
                match stopped.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => job(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!(target: PERIODIC_TARGET, task = name, "periodic task stopped");
        })?;
        Ok(Self {
            name,
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stops the job and waits for its thread to exit. Idempotent.
    pub fn shutdown(&mut self) {
        drop(self.stop.take());
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() {
            warn!(target: PERIODIC_TARGET, task = self.name, "periodic task panicked");
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.shutdown();
    }
}
