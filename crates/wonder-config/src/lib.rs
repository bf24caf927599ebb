//! Shared configuration for the Wonder daemon and CLI.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path`), then `WONDER_*` environment
//! variables, then command-line flags. Both binaries load the same [`Config`]
//! so a land daemon, the stage directory, and the CLI agree on endpoints and
//! timing without extra plumbing.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;
mod period;
mod role;
mod socket;

pub use defaults::{
    DEFAULT_DIAL_TIMEOUT_MS, DEFAULT_EVENT_TICK_MS, DEFAULT_HEARTBEAT_INTERVAL_MS,
    DEFAULT_LAND_COLS, DEFAULT_LAND_ROWS, DEFAULT_LIVENESS_EXPIRY_MS, DEFAULT_LOG_FILTER,
    DEFAULT_SERVER_PORT, DEFAULT_STAGE_PORT, DEFAULT_SWEEP_INTERVAL_MS, default_log_filter,
    default_log_filter_string, default_log_format, default_role, default_server_socket,
    default_stage_socket,
};
use defaults::{
    default_dial_timeout_ms, default_event_tick_ms, default_heartbeat_interval_ms,
    default_land_cols, default_land_rows, default_liveness_expiry_ms, default_sweep_interval_ms,
};
pub use logging::{LogFormat, LogFormatParseError};
use period::non_zero_millis;
pub use role::{Role, RoleParseError};
pub use socket::{SocketEndpoint, SocketParseError};

/// Resolved configuration shared by `wonderd` and `wonder`.
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WONDER")]
pub struct Config {
    /// Endpoint a land daemon listens on; the CLI dials it for land commands.
    #[serde(default = "default_server_socket")]
    pub server_socket: SocketEndpoint,
    /// Endpoint of the stage directory.
    #[serde(default = "default_stage_socket")]
    pub stage_socket: SocketEndpoint,
    /// Service set hosted by the daemon.
    #[serde(default = "default_role")]
    pub role: Role,
    /// `tracing` filter expression.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Dial and write deadline applied by clients; must be non-zero.
    #[serde(
        default = "default_dial_timeout_ms",
        deserialize_with = "non_zero_millis"
    )]
    pub dial_timeout_ms: u64,
    /// Period between heartbeats sent by a land daemon; `0` disables them.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Age after which the stage demotes a silent member.
    #[serde(
        default = "default_liveness_expiry_ms",
        deserialize_with = "non_zero_millis"
    )]
    pub liveness_expiry_ms: u64,
    /// Period of the stage liveness sweep; must be non-zero.
    #[serde(
        default = "default_sweep_interval_ms",
        deserialize_with = "non_zero_millis"
    )]
    pub sweep_interval_ms: u64,
    /// Period of the land event generator; must be non-zero.
    #[serde(
        default = "default_event_tick_ms",
        deserialize_with = "non_zero_millis"
    )]
    pub event_tick_ms: u64,
    /// Land height in tiles.
    #[serde(default = "default_land_rows")]
    pub land_rows: u16,
    /// Land width in tiles.
    #[serde(default = "default_land_cols")]
    pub land_cols: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_socket: default_server_socket(),
            stage_socket: default_stage_socket(),
            role: default_role(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            dial_timeout_ms: default_dial_timeout_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            liveness_expiry_ms: default_liveness_expiry_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            event_tick_ms: default_event_tick_ms(),
            land_rows: default_land_rows(),
            land_cols: default_land_cols(),
        }
    }
}

impl Config {
    /// Endpoint served by land daemons.
    #[must_use]
    pub fn server_socket(&self) -> &SocketEndpoint {
        &self.server_socket
    }

    /// Endpoint served by the stage directory.
    #[must_use]
    pub fn stage_socket(&self) -> &SocketEndpoint {
        &self.stage_socket
    }

    /// Endpoint this daemon binds, chosen by its role.
    #[must_use]
    pub fn listen_socket(&self) -> &SocketEndpoint {
        match self.role {
            Role::Land => &self.server_socket,
            Role::Stage => &self.stage_socket,
        }
    }

    /// Service set hosted by the daemon.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Dial and write deadline applied by clients.
    #[must_use]
    pub const fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }

    /// Heartbeat period, or `None` when heartbeats are disabled.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Option<Duration> {
        if self.heartbeat_interval_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.heartbeat_interval_ms))
        }
    }

    /// Age after which a silent member is demoted.
    #[must_use]
    pub const fn liveness_expiry(&self) -> Duration {
        Duration::from_millis(self.liveness_expiry_ms)
    }

    /// Period of the liveness sweep.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Period of the land event generator.
    #[must_use]
    pub const fn event_tick(&self) -> Duration {
        Duration::from_millis(self.event_tick_ms)
    }

    /// Land dimensions as `(rows, cols)`.
    #[must_use]
    pub const fn land_size(&self) -> (u16, u16) {
        (self.land_rows, self.land_cols)
    }
}
