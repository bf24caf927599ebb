//! Behavioural suites for the Wonder daemon.

mod daemon_behaviour;
mod registry_behaviour;
mod support;
