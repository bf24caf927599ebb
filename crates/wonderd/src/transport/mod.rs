//! TCP listener for daemon endpoints.
//!
//! The transport module binds the configured endpoint, accepts connections in
//! a background thread, and hands each one to a [`ConnectionHandler`] on its
//! own thread. Live connections are tracked so shutdown can close them.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::handler::ConnectionHandler;
pub(crate) use self::listener::{ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, HoldingHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
