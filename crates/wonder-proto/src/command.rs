use std::fmt;

use thiserror::Error;

/// Commands understood by Wonder daemons.
///
/// Land daemons serve `plant`, `get-info`, and `subscribe-events`; the stage
/// serves `list-servers` and `report-alive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Places sprites on the land.
    Plant,
    /// Streams a finite snapshot of the land.
    GetInfo,
    /// Streams land events until the connection ends.
    SubscribeEvents,
    /// Lists members currently reported alive.
    ListServers,
    /// Records a heartbeat for a member.
    ReportAlive,
}

impl Command {
    /// Every command, in wire-table order.
    pub const ALL: [Self; 5] = [
        Self::Plant,
        Self::GetInfo,
        Self::SubscribeEvents,
        Self::ListServers,
        Self::ReportAlive,
    ];

    /// Parses a wire command name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCommand`] when `value` names no command.
    pub fn parse(value: &str) -> Result<Self, UnknownCommand> {
        match value {
            "plant" => Ok(Self::Plant),
            "get-info" => Ok(Self::GetInfo),
            "subscribe-events" => Ok(Self::SubscribeEvents),
            "list-servers" => Ok(Self::ListServers),
            "report-alive" => Ok(Self::ReportAlive),
            _ => Err(UnknownCommand {
                name: value.to_owned(),
            }),
        }
    }

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plant => "plant",
            Self::GetInfo => "get-info",
            Self::SubscribeEvents => "subscribe-events",
            Self::ListServers => "list-servers",
            Self::ReportAlive => "report-alive",
        }
    }

    /// Returns `true` for commands answered by an acknowledgement and a stream.
    #[must_use]
    pub const fn is_streaming(self) -> bool {
        matches!(self, Self::GetInfo | Self::SubscribeEvents)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Command name that matches no known command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command '{name}'")]
pub struct UnknownCommand {
    /// Name as received.
    pub name: String,
}
