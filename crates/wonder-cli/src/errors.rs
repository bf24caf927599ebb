//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use wonder_client::{CallError, ClientError};
use wonder_proto::Command;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("{command} failed: {source}")]
    Call {
        command: Command,
        #[source]
        source: CallError,
    },
    #[error("{command} ended before the daemon finished replying")]
    StreamEnded { command: Command },
    #[error("failed to decode {kind} payload: {source}")]
    DecodePayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] io::Error),
}
