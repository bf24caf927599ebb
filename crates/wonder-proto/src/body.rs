//! Request and response bodies, one pair per command.

use serde::{Deserialize, Serialize};

/// Body of `plant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRequest {
    /// Plant kind: `tree`, `flower`, or `grass`.
    pub what: String,
    /// Free-form colour, kept on flowers.
    pub color: String,
    /// Number of sprites to place.
    pub number: u32,
}

/// Reply to `plant`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantResponse {
    /// Sprites placed.
    pub succeeded: u32,
    /// Sprites that could not be placed.
    pub failed: u32,
}

/// Most sprites a land holds, so a `get-info` stream carries at most this
/// many sprite items between its `tiles` and `done` items.
pub const MAX_LAND_SPRITES: usize = 10_000;

/// Upper bound on the items of one `get-info` stream.
pub const MAX_INFO_ITEMS: usize = MAX_LAND_SPRITES + 2;

/// Body of `get-info`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRequest {}

/// Body of `subscribe-events`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {}

/// Body of `list-servers`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListServersRequest {}

/// Reply to `list-servers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListServersResponse {
    /// Alive members, sorted.
    pub members: Vec<String>,
}

/// Body of `report-alive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAliveRequest {
    /// `host:port` the member is reachable on.
    pub member_address: String,
}

/// Reply to `report-alive`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAliveResponse {
    /// Human-readable acknowledgement.
    pub message: String,
}
