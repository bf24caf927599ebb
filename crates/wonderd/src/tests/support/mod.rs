//! Test harness utilities for the daemon behavioural suites.

mod config_loader;
mod daemon_world;
mod reporter;
mod shutdown;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use daemon_world::{DaemonWorld, WAIT_TIMEOUT};
pub use reporter::HealthEvent;
pub use world::{TestWorld, world};
