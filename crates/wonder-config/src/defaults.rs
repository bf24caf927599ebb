use crate::logging::LogFormat;
use crate::role::Role;
use crate::socket::SocketEndpoint;

/// Default port served by a land daemon.
pub const DEFAULT_SERVER_PORT: u16 = 9898;

/// Default port served by the stage directory.
pub const DEFAULT_STAGE_PORT: u16 = 9899;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default dial and write deadline for clients, in milliseconds.
pub const DEFAULT_DIAL_TIMEOUT_MS: u64 = 10_000;

/// Default period between heartbeats sent by a land daemon, in milliseconds.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 5_000;

/// Default age after which a silent member is considered dead, in milliseconds.
pub const DEFAULT_LIVENESS_EXPIRY_MS: u64 = 15_000;

/// Default period of the liveness sweep, in milliseconds.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Default period of the land event generator, in milliseconds.
pub const DEFAULT_EVENT_TICK_MS: u64 = 200;

/// Default land height in tiles.
pub const DEFAULT_LAND_ROWS: u16 = 20;

/// Default land width in tiles.
pub const DEFAULT_LAND_COLS: u16 = 40;

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default role of a daemon process.
#[must_use]
pub fn default_role() -> Role {
    Role::Land
}

/// Endpoint a land daemon listens on and the CLI dials for land commands.
#[must_use]
pub fn default_server_socket() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_SERVER_PORT)
}

/// Endpoint of the stage directory.
#[must_use]
pub fn default_stage_socket() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_STAGE_PORT)
}

pub(crate) const fn default_dial_timeout_ms() -> u64 {
    DEFAULT_DIAL_TIMEOUT_MS
}

pub(crate) const fn default_heartbeat_interval_ms() -> u64 {
    DEFAULT_HEARTBEAT_INTERVAL_MS
}

pub(crate) const fn default_liveness_expiry_ms() -> u64 {
    DEFAULT_LIVENESS_EXPIRY_MS
}

pub(crate) const fn default_sweep_interval_ms() -> u64 {
    DEFAULT_SWEEP_INTERVAL_MS
}

pub(crate) const fn default_event_tick_ms() -> u64 {
    DEFAULT_EVENT_TICK_MS
}

pub(crate) const fn default_land_rows() -> u16 {
    DEFAULT_LAND_ROWS
}

pub(crate) const fn default_land_cols() -> u16 {
    DEFAULT_LAND_COLS
}
