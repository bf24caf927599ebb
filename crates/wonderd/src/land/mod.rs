//! The simulated land served by a land daemon.
//!
//! A land is a grid of tiles with sprites standing on it. Clients plant
//! sprites, read snapshots, and subscribe to the events produced as Alice
//! chases the Rabbit across the grid. All randomness comes from the injected
//! generator so a seeded land replays identically.

mod errors;
mod events;
mod sprite;
mod ticker;
mod world;

pub use self::errors::WorldError;
pub use self::events::{EVENT_QUEUE_CAPACITY, EventFanout, EventQueue};
pub use self::sprite::{
    Direction, PlantKind, Point, Sprite, SpriteAdd, SpriteJump, SpriteKind, SpriteMove, Tile,
};
pub use self::ticker::EventTicker;
pub use self::world::{ALICE, Land, MAX_SPRITES, RABBIT, RABBIT_JUMP_PERIOD};

use std::sync::Arc;

use wonder_proto::{PlantRequest, PlantResponse, StreamItem};

pub(crate) const LAND_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::land");

/// Operations the dispatcher needs from a land.
#[cfg_attr(test, mockall::automock)]
pub trait World: Send + Sync {
    /// Places the requested sprites.
    ///
    /// # Errors
    ///
    /// Fails when the plant kind is unknown or the land would exceed
    /// [`MAX_SPRITES`].
    fn plant(&self, request: &PlantRequest) -> Result<PlantResponse, WorldError>;

    /// Returns the tiles, then every sprite, then `done`.
    ///
    /// # Errors
    ///
    /// Fails when an item cannot be encoded.
    fn snapshot(&self) -> Result<Vec<StreamItem>, WorldError>;

    /// Registers a queue that receives every subsequent event.
    fn subscribe(&self) -> Arc<EventQueue>;
}
