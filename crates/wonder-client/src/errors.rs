use std::io;

use thiserror::Error;
use wonder_proto::{CodecError, Command};

/// Errors surfaced by [`crate::RpcClient`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint host could not be resolved.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        /// Endpoint as configured.
        endpoint: String,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// Dialling the endpoint failed or timed out.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Endpoint as configured.
        endpoint: String,
        /// Socket error.
        #[source]
        source: io::Error,
    },
    /// The connected socket could not be configured.
    #[error("failed to configure socket: {0}")]
    Socket(#[source] io::Error),
    /// The receive loop thread could not be started.
    #[error("failed to spawn receive loop: {0}")]
    SpawnReceiver(#[source] io::Error),
    /// The transport is closed.
    #[error("connection closed")]
    Closed,
    /// Writing the request failed; the call was not registered.
    #[error("failed to send {command}: {source}")]
    Send {
        /// Command being sent.
        command: Command,
        /// Codec failure.
        #[source]
        source: CodecError,
    },
    /// The server rejected a streaming call in its acknowledgement.
    #[error("{command} rejected: {message}")]
    Rejected {
        /// Command that was rejected.
        command: Command,
        /// Remote error text.
        message: String,
    },
}

impl ClientError {
    pub(crate) fn from_call(command: Command, error: CallError) -> Self {
        match error {
            CallError::Remote(message) => Self::Rejected { command, message },
            CallError::Closed => Self::Closed,
        }
    }
}

/// Failure delivered in place of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The server answered with a non-empty header error.
    #[error("remote error: {0}")]
    Remote(String),
    /// The connection closed before the reply arrived.
    #[error("connection closed before a reply arrived")]
    Closed,
}
