//! Error types for request dispatch failures.
//!
//! Every variant ends the session: a body that fails to decode leaves the
//! stream out of step, and a failed write means the peer is gone.

use std::io;

use thiserror::Error;

use wonder_proto::CodecError;

/// Errors that end a connection's request loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request body did not match the command.
    #[error("failed to decode '{command}' request body: {source}")]
    Decode {
        /// Wire name of the command.
        command: String,
        /// Codec error.
        #[source]
        source: CodecError,
    },
    /// A response could not be written.
    #[error("failed to write response for sequence {sequence}: {source}")]
    Write {
        /// Sequence of the response.
        sequence: u64,
        /// Codec error.
        #[source]
        source: CodecError,
    },
    /// The connection socket could not be cloned for writing.
    #[error("failed to prepare connection socket: {0}")]
    Socket(#[source] io::Error),
    /// A stream pump thread could not be started.
    #[error("failed to start stream pump for sequence {sequence}: {source}")]
    Spawn {
        /// Sequence of the stream.
        sequence: u64,
        /// Thread builder error.
        #[source]
        source: io::Error,
    },
}
