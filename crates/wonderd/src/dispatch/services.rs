use std::sync::Arc;

use wonder_config::Role;
use wonder_proto::Command;

use crate::land::World;
use crate::registry::LivenessRegistry;

/// Collaborators a daemon exposes to its connections.
#[derive(Clone)]
pub(crate) enum Services {
    /// Land daemon: `plant`, `get-info`, `subscribe-events`.
    Land(Arc<dyn World>),
    /// Stage daemon: `list-servers`, `report-alive`.
    Stage(Arc<LivenessRegistry>),
}

impl Services {
    pub(crate) const fn role(&self) -> Role {
        match self {
            Self::Land(_) => Role::Land,
            Self::Stage(_) => Role::Stage,
        }
    }
}

/// Error text for a known command the daemon role does not serve.
pub(crate) fn not_served(command: Command) -> String {
    format!("command '{command}' is not served by this daemon")
}
