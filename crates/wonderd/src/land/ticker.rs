use std::io;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::periodic::PeriodicTask;

use super::{LAND_TARGET, Land};

/// Background thread advancing a land one tick per period.
#[derive(Debug)]
pub struct EventTicker {
    task: PeriodicTask,
}

impl EventTicker {
    /// Starts ticking `land` every `period`.
    ///
    /// # Errors
    ///
    /// Returns the spawn error when the thread cannot be started.
    pub fn spawn(land: Arc<Land>, period: Duration) -> io::Result<Self> {
        let task = PeriodicTask::spawn("wonderd-ticker", period, move || {
            if let Err(error) = land.tick() {
                warn!(target: LAND_TARGET, %error, "land tick failed");
            }
        })?;
        Ok(Self { task })
    }

    /// Stops the ticker and waits for its thread. Idempotent.
    pub fn shutdown(&mut self) {
        self.task.shutdown();
    }
}
