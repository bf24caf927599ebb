use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::periodic::PeriodicTask;

use super::{Clock, REGISTRY_TARGET};

#[derive(Debug, Default)]
struct Members {
    alive: HashMap<String, Instant>,
    dead: HashMap<String, Instant>,
}

/// Directory of members that recently reported themselves alive.
pub struct LivenessRegistry {
    members: RwLock<Members>,
    expiry: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LivenessRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("LivenessRegistry")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl LivenessRegistry {
    /// Builds an empty registry that demotes members silent for `expiry`.
    #[must_use]
    pub fn new(expiry: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            members: RwLock::new(Members::default()),
            expiry,
            clock,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Members> {
        self.members
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Members> {
        self.members
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    /// Records a heartbeat for `member` and returns the acknowledgement text.
    pub fn report_alive(&self, member: &str) -> String {
        let now = self.clock.now();
        let mut members = self.write();
        if members.dead.remove(member).is_some() {
            info!(target: REGISTRY_TARGET, member, "member revived");
        }
        if members.alive.insert(member.to_owned(), now).is_none() {
            debug!(target: REGISTRY_TARGET, member, "member joined");
        }
        format!("{member} is alive")
    }

    /// Alive members in ascending order.
    #[must_use]
    pub fn list_alive(&self) -> Vec<String> {
        sorted_keys(&self.read().alive)
    }

    /// Demoted members in ascending order.
    #[must_use]
    pub fn list_dead(&self) -> Vec<String> {
        sorted_keys(&self.read().dead)
    }

    /// Moves every member silent for longer than the expiry into the dead set
    /// and returns the members moved, in ascending order.
    pub fn sweep(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut members = self.write();
        let mut expired: Vec<String> = members
            .alive
            .iter()
            .filter(|(_, seen)| now.saturating_duration_since(**seen) > self.expiry)
            .map(|(member, _)| member.clone())
            .collect();
        for member in &expired {
            if let Some(seen) = members.alive.remove(member) {
                members.dead.insert(member.clone(), seen);
                info!(target: REGISTRY_TARGET, member = %member, "member expired");
            }
        }
        drop(members);
        expired.sort_unstable();
        expired
    }

    /// Runs [`Self::sweep`] every `interval` on a background thread.
    ///
    /// # Errors
    ///
    /// Returns the spawn error when the thread cannot be started.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> io::Result<PeriodicTask> {
        let registry = Arc::clone(self);
        PeriodicTask::spawn("wonderd-sweeper", interval, move || {
            registry.sweep();
        })
    }
}

fn sorted_keys(map: &HashMap<String, Instant>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort_unstable();
    keys
}
