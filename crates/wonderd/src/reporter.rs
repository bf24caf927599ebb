//! Periodic heartbeats from a land daemon to the stage.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use tracing::{debug, warn};

use wonder_client::RpcClient;
use wonder_config::SocketEndpoint;

use crate::periodic::PeriodicTask;

const REPORTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reporter");

/// Connection state carried from one heartbeat to the next.
struct Heartbeat {
    stage: SocketEndpoint,
    advertised: String,
    timeout: Duration,
    client: Option<RpcClient>,
}

impl Heartbeat {
    fn connected(&mut self) -> Option<&RpcClient> {
        if self.client.as_ref().is_some_and(RpcClient::is_closed) {
            debug!(target: REPORTER_TARGET, stage = %self.stage, "stage connection closed");
            self.client = None;
        }
        if self.client.is_none() {
            match RpcClient::connect(&self.stage, self.timeout) {
                Ok(client) => self.client = Some(client),
                Err(error) => {
                    warn!(target: REPORTER_TARGET, stage = %self.stage, %error, "failed to reach stage, skipping heartbeat");
                }
            }
        }
        self.client.as_ref()
    }

    fn beat(&mut self) {
        let timeout = self.timeout;
        let advertised = self.advertised.clone();
        let Some(client) = self.connected() else {
            return;
        };
        let (replies, reply) = mpsc::sync_channel(1);
        if let Err(error) = client.report_alive(&advertised, replies) {
            warn!(target: REPORTER_TARGET, %error, "failed to send heartbeat");
            self.client = None;
            return;
        }
        match reply.recv_timeout(timeout) {
            Ok(Ok(ack)) => debug!(target: REPORTER_TARGET, message = %ack.message, "heartbeat acknowledged"),
            Ok(Err(error)) => warn!(target: REPORTER_TARGET, %error, "heartbeat failed"),
            Err(RecvTimeoutError::Timeout) => {
                warn!(target: REPORTER_TARGET, timeout_ms = timeout.as_millis(), "heartbeat unanswered, dropping stage connection");
                // Closing fails the pending reply and empties the dispatch table.
                if let Some(stalled) = self.client.take() {
                    stalled.close();
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                debug!(target: REPORTER_TARGET, "heartbeat reply dropped");
            }
        }
    }
}

/// Background thread reporting this daemon alive to the stage.
#[derive(Debug)]
pub struct HeartbeatReporter {
    task: PeriodicTask,
}

impl HeartbeatReporter {
    /// Reports `advertised` to `stage` every `interval`.
    ///
    /// `timeout` bounds both the dial and the wait for each acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns the spawn error when the thread cannot be started.
    pub fn spawn(
        stage: SocketEndpoint,
        advertised: String,
        interval: Duration,
        timeout: Duration,
    ) -> io::Result<Self> {
        let mut heartbeat = Heartbeat {
            stage,
            advertised,
            timeout,
            client: None,
        };
        let task = PeriodicTask::spawn("wonderd-heartbeat", interval, move || heartbeat.beat())?;
        Ok(Self { task })
    }

    /// Stops reporting. Idempotent.
    pub fn shutdown(&mut self) {
        self.task.shutdown();
    }
}
