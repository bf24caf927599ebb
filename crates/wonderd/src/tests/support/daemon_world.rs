//! Runs the full daemon on a background thread for end-to-end scenarios.

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wonder_client::RpcClient;
use wonder_config::{Role, SocketEndpoint};

use crate::health::HealthReporter;
use crate::process::LaunchError;
use crate::process::launch::{LaunchPlan, ProcessControl, ServiceDeps, run_daemon_with};

use super::config_loader::TestConfigLoader;
use super::reporter::{HealthEvent, RecordingHealthReporter};
use super::shutdown::TestShutdownSignal;

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// One daemon process running in-thread.
pub struct DaemonWorld {
    reporter: Arc<RecordingHealthReporter>,
    shutdown: TestShutdownSignal,
    handle: Option<JoinHandle<Result<(), LaunchError>>>,
    addr: SocketAddr,
}

impl DaemonWorld {
    /// Launches a daemon and waits until it serves connections.
    pub fn start(loader: TestConfigLoader) -> Result<Self, String> {
        let reporter = Arc::new(RecordingHealthReporter::default());
        let shutdown = TestShutdownSignal::default();
        let plan = LaunchPlan {
            process: ProcessControl {
                shutdown: shutdown.clone(),
            },
            services: ServiceDeps {
                loader,
                reporter: reporter.clone() as Arc<dyn HealthReporter>,
            },
        };
        let handle = thread::spawn(move || run_daemon_with(plan));
        let addr = reporter
            .listener_addr(WAIT_TIMEOUT)
            .ok_or("daemon never bound its listener")?;
        reporter
            .wait_for(WAIT_TIMEOUT, |event| {
                matches!(event, HealthEvent::ServicesStarted(_)).then_some(())
            })
            .ok_or("daemon never started its services")?;
        Ok(Self {
            reporter,
            shutdown,
            handle: Some(handle),
            addr,
        })
    }

    /// Launches a daemon whose configuration is expected to fail.
    pub fn run_to_completion(loader: impl crate::bootstrap::ConfigLoader + 'static) -> Result<(), LaunchError> {
        let plan = LaunchPlan {
            process: ProcessControl {
                shutdown: TestShutdownSignal::default(),
            },
            services: ServiceDeps {
                loader,
                reporter: Arc::new(RecordingHealthReporter::default()) as Arc<dyn HealthReporter>,
            },
        };
        run_daemon_with(plan)
    }

    #[must_use]
    pub fn endpoint(&self) -> SocketEndpoint {
        SocketEndpoint::from(self.addr)
    }

    pub fn connect(&self) -> Result<RpcClient, String> {
        RpcClient::connect(&self.endpoint(), WAIT_TIMEOUT).map_err(|error| error.to_string())
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.reporter.wait_for(Duration::ZERO, |event| match event {
            HealthEvent::ServicesStarted(role) => Some(*role),
            _ => None,
        })
    }

    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.reporter.events()
    }

    /// Triggers shutdown and waits for the launch thread.
    pub fn stop(&mut self) -> Result<(), String> {
        self.shutdown.trigger();
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        handle
            .join()
            .map_err(|_| "daemon thread panicked".to_owned())?
            .map_err(|error| error.to_string())
    }
}

impl Drop for DaemonWorld {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.stop();
        }
    }
}
