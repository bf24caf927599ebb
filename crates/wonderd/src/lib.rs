//! The Wonder daemon.
//!
//! One binary hosts either role of the system. A *land* daemon serves a
//! simulated world: clients plant sprites, read snapshots, and subscribe to
//! the events produced as the world ticks. A *stage* daemon hosts the
//! liveness registry that land daemons report their heartbeats to.
//!
//! Both roles share the same plumbing. The transport accepts TCP connections
//! and gives each one a dispatch session, which reads sequence-tagged
//! requests and answers each with one reply or an acknowledged stream.
//! Lifecycle milestones are reported through [`HealthReporter`], and the
//! process stops on SIGTERM, SIGINT, SIGQUIT, or SIGHUP.

mod bootstrap;
mod dispatch;
mod health;
mod land;
mod periodic;
mod process;
mod registry;
mod reporter;
mod runtime;
mod telemetry;
mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use land::{
    ALICE, Direction, EVENT_QUEUE_CAPACITY, EventFanout, EventQueue, EventTicker, Land,
    MAX_SPRITES, PlantKind, Point, RABBIT, RABBIT_JUMP_PERIOD, Sprite, SpriteAdd, SpriteJump,
    SpriteKind, SpriteMove, Tile, World, WorldError,
};
pub use periodic::{MIN_PERIOD, PeriodicTask};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon};
pub use registry::{Clock, LivenessRegistry, SystemClock};
pub use reporter::HeartbeatReporter;
pub use transport::ListenerError;
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

#[cfg(test)]
mod tests;
