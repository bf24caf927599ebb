//! Heartbeat-driven liveness registry hosted by the stage daemon.
//!
//! Members report themselves alive by address. A periodic sweep demotes every
//! member whose last report is older than the expiry threshold. A member is
//! always in exactly one of the alive and dead sets, and a fresh report
//! revives a dead member.

mod clock;
mod liveness;

pub use self::clock::{Clock, SystemClock};
#[cfg(test)]
pub(crate) use self::clock::ManualClock;
pub use self::liveness::LivenessRegistry;

pub(crate) const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");
