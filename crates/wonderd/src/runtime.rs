//! Background services hosted by each daemon role.

use std::net::SocketAddr;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use wonder_config::{Config, Role, SocketEndpoint};

use crate::dispatch::Services;
use crate::land::{EventTicker, Land};
use crate::periodic::PeriodicTask;
use crate::process::LaunchError;
use crate::registry::{LivenessRegistry, SystemClock};
use crate::reporter::HeartbeatReporter;

const RUNTIME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::runtime");

/// Running threads and shared state of one daemon role.
pub(crate) enum RoleServices {
    /// A land, its ticker, and an optional heartbeat to the stage.
    Land {
        land: Arc<Land>,
        ticker: EventTicker,
        heartbeat: Option<HeartbeatReporter>,
    },
    /// The liveness registry and its sweeper.
    Stage {
        registry: Arc<LivenessRegistry>,
        sweeper: PeriodicTask,
    },
}

impl RoleServices {
    /// Starts the services for `config.role()`.
    ///
    /// `local_addr` is the address the listener actually bound; a land daemon
    /// configured with port `0` advertises it to the stage.
    pub(crate) fn start(config: &Config, local_addr: SocketAddr) -> Result<Self, LaunchError> {
        match config.role() {
            Role::Land => Self::start_land(config, local_addr),
            Role::Stage => Self::start_stage(config),
        }
    }

    fn start_land(config: &Config, local_addr: SocketAddr) -> Result<Self, LaunchError> {
        let (rows, cols) = config.land_size();
        let land = Arc::new(Land::new(rows, cols, StdRng::from_rng(&mut rand::rng())));
        land.populate();
        let ticker = EventTicker::spawn(Arc::clone(&land), config.event_tick())
            .map_err(LaunchError::service("land ticker"))?;
        let heartbeat = match config.heartbeat_interval() {
            Some(interval) => {
                let advertised = advertised_address(config.server_socket(), local_addr);
                info!(target: RUNTIME_TARGET, stage = %config.stage_socket(), %advertised, "reporting to stage");
                Some(
                    HeartbeatReporter::spawn(
                        config.stage_socket().clone(),
                        advertised,
                        interval,
                        config.dial_timeout(),
                    )
                    .map_err(LaunchError::service("heartbeat reporter"))?,
                )
            }
            None => None,
        };
        Ok(Self::Land {
            land,
            ticker,
            heartbeat,
        })
    }

    fn start_stage(config: &Config) -> Result<Self, LaunchError> {
        let registry = Arc::new(LivenessRegistry::new(
            config.liveness_expiry(),
            Arc::new(SystemClock),
        ));
        let sweeper = registry
            .spawn_sweeper(config.sweep_interval())
            .map_err(LaunchError::service("liveness sweeper"))?;
        Ok(Self::Stage { registry, sweeper })
    }

    /// Collaborators handed to every connection.
    pub(crate) fn dispatch(&self) -> Services {
        match self {
            Self::Land { land, .. } => Services::Land(Arc::<Land>::clone(land)),
            Self::Stage { registry, .. } => Services::Stage(Arc::clone(registry)),
        }
    }

    /// Stops every background thread. Idempotent.
    pub(crate) fn shutdown(&mut self) {
        match self {
            Self::Land {
                ticker, heartbeat, ..
            } => {
                if let Some(heartbeat) = heartbeat.as_mut() {
                    heartbeat.shutdown();
                }
                ticker.shutdown();
            }
            Self::Stage { sweeper, .. } => sweeper.shutdown(),
        }
    }
}

/// Address a land daemon reports to the stage.
fn advertised_address(configured: &SocketEndpoint, local_addr: SocketAddr) -> String {
    if configured.port == 0 {
        SocketEndpoint::from(local_addr).authority()
    } else {
        configured.authority()
    }
}
