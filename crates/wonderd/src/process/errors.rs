//! Error surface for launching and supervising the daemon.

use std::io;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the daemon failed.
    #[error("bootstrap did not complete: {source}")]
    Bootstrap {
        /// Bootstrap error.
        #[from]
        source: BootstrapError,
    },
    /// Binding or running the listener failed.
    #[error("listener stopped with an error: {source}")]
    Listener {
        /// Listener error.
        #[from]
        source: ListenerError,
    },
    /// A background service thread could not be started.
    #[error("failed to start {service}: {source}")]
    Service {
        /// Thread that failed to start.
        service: &'static str,
        /// Thread builder error.
        #[source]
        source: io::Error,
    },
    /// Waiting for shutdown failed.
    #[error("could not wait for a stop signal: {source}")]
    Shutdown {
        /// Shutdown error.
        #[from]
        source: ShutdownError,
    },
}

impl LaunchError {
    pub(crate) fn service(service: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Service { service, source }
    }
}
