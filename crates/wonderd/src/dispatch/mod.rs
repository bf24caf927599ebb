//! Per-connection request dispatch.
//!
//! Each accepted connection runs one [`Session`]. The session reads request
//! headers in a loop, decodes the body the command names, and routes it to
//! the land or the liveness registry depending on the daemon role:
//!
//! ```text
//! AWAIT_HEADER → DECODE_BODY → DISPATCH → SEND_RESPONSE ─┐
//!      ▲                                 └→ START_STREAM ─┤
//!      └──────────────────────────────────────────────────┘
//! ```
//!
//! Simple commands reply with one header and body. Streaming commands reply
//! with a bodiless acknowledgement, then a pump thread keeps writing items
//! under the same sequence. Every write goes through one [`ResponseSink`] so
//! header and body pairs from different threads never interleave.

mod errors;
mod handler;
mod router;
mod services;
mod session;
mod sink;

pub(crate) use self::errors::DispatchError;
pub(crate) use self::handler::DispatchConnectionHandler;
pub(crate) use self::services::Services;
pub(crate) use self::session::Session;
pub(crate) use self::sink::ResponseSink;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
