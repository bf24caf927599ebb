use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which service set a `wonderd` process hosts.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    /// Serves the simulated land: `plant`, `get-info`, `subscribe-events`.
    #[default]
    Land,
    /// Serves the liveness directory: `list-servers`, `report-alive`.
    Stage,
}

/// Errors encountered while parsing a [`Role`] from text.
pub type RoleParseError = strum::ParseError;
