//! Configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};

use wonder_config::{Config, LogFormat, Role, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that binds loopback port `0` so scenarios never collide.
#[derive(Debug, Clone)]
pub struct TestConfigLoader {
    config: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new(role: Role) -> Self {
        let ephemeral = SocketEndpoint::tcp("127.0.0.1", 0);
        Self {
            config: Config {
                role,
                server_socket: ephemeral.clone(),
                stage_socket: ephemeral,
                log_filter: "warn".to_owned(),
                log_format: LogFormat::Compact,
                heartbeat_interval_ms: 0,
                event_tick_ms: 10,
                sweep_interval_ms: 10,
                land_rows: 4,
                land_cols: 4,
                ..Config::default()
            },
        }
    }

    /// Land daemon reporting to the stage at `stage` every `interval_ms`.
    #[must_use]
    pub fn reporting_to(stage: SocketEndpoint, interval_ms: u64) -> Self {
        let mut loader = Self::new(Role::Land);
        loader.config.stage_socket = stage;
        loader.config.heartbeat_interval_ms = interval_ms;
        loader
    }

    /// Stage daemon expiring members after `expiry_ms`.
    #[must_use]
    pub fn stage_expiring_after(expiry_ms: u64) -> Self {
        let mut loader = Self::new(Role::Stage);
        loader.config.liveness_expiry_ms = expiry_ms;
        loader
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that fails by passing an unusable socket on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("wonderd"),
            OsString::from("--server-socket"),
            OsString::from("unix:///tmp/wonder.sock"),
        ];
        Config::load_from_iter(args)
    }
}
