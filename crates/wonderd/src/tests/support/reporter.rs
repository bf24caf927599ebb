//! Test double for [`HealthReporter`] that records lifecycle events.

use std::net::SocketAddr;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use wonder_config::{Config, Role};

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;

/// Lifecycle events captured during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ListenerReady(SocketAddr),
    ServicesStarted(Role),
    ShutdownCompleted,
}

/// Records health events and lets tests wait for them.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
    changed: Condvar,
}

impl RecordingHealthReporter {
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
        self.changed.notify_all();
    }

    /// Waits until an event satisfies `select`, returning its projection.
    pub fn wait_for<T>(
        &self,
        timeout: Duration,
        mut select: impl FnMut(&HealthEvent) -> Option<T>,
    ) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut events = self.events.lock().expect("health reporter mutex poisoned");
        loop {
            if let Some(found) = events.iter().find_map(&mut select) {
                return Some(found);
            }
            let remaining = deadline.checked_duration_since(Instant::now())?;
            events = self
                .changed
                .wait_timeout(events, remaining)
                .expect("health reporter mutex poisoned")
                .0;
        }
    }

    /// Address reported by `listener_ready`.
    pub fn listener_addr(&self, timeout: Duration) -> Option<SocketAddr> {
        self.wait_for(timeout, |event| match event {
            HealthEvent::ListenerReady(addr) => Some(*addr),
            _ => None,
        })
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_ready(&self, addr: SocketAddr) {
        self.record(HealthEvent::ListenerReady(addr));
    }

    fn services_started(&self, role: Role) {
        self.record(HealthEvent::ServicesStarted(role));
    }

    fn shutdown_completed(&self) {
        self.record(HealthEvent::ShutdownCompleted);
    }
}
