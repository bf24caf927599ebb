//! Daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::StructuredHealthReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::DispatchConnectionHandler;
use crate::health::HealthReporter;
use crate::runtime::RoleServices;
use crate::transport::SocketListener;

use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};
use super::PROCESS_TARGET;

/// Process-level collaborators controlling the daemon lifecycle.
pub(crate) struct ProcessControl<S> {
    pub(crate) shutdown: S,
}

/// Service dependencies required to construct the daemon runtime.
pub(crate) struct ServiceDeps<L> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
}

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) process: ProcessControl<S>,
    pub(crate) services: ServiceDeps<L>,
}

/// Runs the daemon with production collaborators until a termination signal.
///
/// # Errors
///
/// Returns the first launch step that fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        process: ProcessControl {
            shutdown: SystemShutdownSignal,
        },
        services: ServiceDeps {
            loader: SystemConfigLoader,
            reporter: Arc::new(StructuredHealthReporter::new()),
        },
    })
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan { process, services } = plan;
    let ServiceDeps { loader, reporter } = services;

    let daemon = bootstrap_with(&loader, reporter)?;
    let config = daemon.config();
    let reporter = daemon.reporter();
    info!(target: PROCESS_TARGET, role = %config.role(), "starting daemon runtime");

    let listener = SocketListener::bind(config.listen_socket())?;
    let local_addr = listener.local_addr();
    reporter.listener_ready(local_addr);

    let mut role_services = RoleServices::start(config, local_addr)?;
    let handler = Arc::new(DispatchConnectionHandler::new(role_services.dispatch()));
    let listener_handle = match listener.start(handler) {
        Ok(handle) => handle,
        Err(error) => {
            role_services.shutdown();
            return Err(error.into());
        }
    };
    reporter.services_started(config.role());

    let waited = process.shutdown.wait();
    info!(target: PROCESS_TARGET, "stopping daemon runtime");
    listener_handle.shutdown();
    let joined = listener_handle.join();
    role_services.shutdown();
    waited?;
    joined?;
    reporter.shutdown_completed();
    Ok(())
}
