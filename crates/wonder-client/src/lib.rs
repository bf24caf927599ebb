//! Client side of the Wonder transport.
//!
//! An [`RpcClient`] owns one TCP connection. Every call allocates a fresh
//! sequence number and registers a handler for it; a background receive loop
//! reads response headers and routes each message to the handler registered
//! under its sequence. Replies reach callers through bounded channels that
//! the caller owns, so a slow caller loses messages instead of stalling the
//! connection.

mod client;
mod dispatch;
mod errors;
mod handler;

pub use client::RpcClient;
pub use errors::{CallError, ClientError};
pub use handler::Reply;

/// Tracing target for the client transport.
pub(crate) const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
