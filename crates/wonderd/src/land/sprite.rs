//! Land data: tiles, sprites, and the payloads of land events.

use serde::Serialize;
use strum::{Display, EnumString};

use wonder_proto::InfoKind;

/// Grid coordinate; `x` is the column and `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
}

impl Point {
    /// Builds a point.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Returns the neighbouring point one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::new(self.x, self.y.saturating_sub(1)),
            Direction::Down => Self::new(self.x, self.y.saturating_add(1)),
            Direction::Left => Self::new(self.x.saturating_sub(1), self.y),
            Direction::Right => Self::new(self.x.saturating_add(1), self.y),
        }
    }
}

/// One cell of the land grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tile {
    /// Shade of the cell, `0` or `1`.
    pub gradient: u8,
}

/// Kinds accepted by `plant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PlantKind {
    /// A tree.
    Tree,
    /// A flower; keeps the requested colour.
    Flower,
    /// A patch of grass.
    Grass,
}

/// Every sprite category the land holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteKind {
    /// Planted tree.
    Tree,
    /// Planted flower.
    Flower,
    /// Planted grass.
    Grass,
    /// Alice.
    Human,
    /// The Rabbit.
    Animal,
}

impl SpriteKind {
    /// Info stream kind used when the sprite appears in a snapshot.
    #[must_use]
    pub const fn info_kind(self) -> InfoKind {
        match self {
            Self::Tree => InfoKind::Trees,
            Self::Flower => InfoKind::Flowers,
            Self::Grass => InfoKind::Grass,
            Self::Human => InfoKind::Human,
            Self::Animal => InfoKind::Animal,
        }
    }
}

impl From<PlantKind> for SpriteKind {
    fn from(kind: PlantKind) -> Self {
        match kind {
            PlantKind::Tree => Self::Tree,
            PlantKind::Flower => Self::Flower,
            PlantKind::Grass => Self::Grass,
        }
    }
}

/// Something standing on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sprite {
    #[serde(skip)]
    pub(crate) kind: SpriteKind,
    #[serde(flatten)]
    pub(crate) point: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) color: Option<String>,
}

impl Sprite {
    pub(crate) fn named(kind: SpriteKind, name: &str, point: Point) -> Self {
        Self {
            kind,
            point,
            name: Some(name.to_owned()),
            color: None,
        }
    }

    pub(crate) fn planted(kind: PlantKind, color: &str, point: Point) -> Self {
        let color = matches!(kind, PlantKind::Flower).then(|| color.to_owned());
        Self {
            kind: kind.into(),
            point,
            name: None,
            color,
        }
    }

    pub(crate) fn is_named(&self, kind: SpriteKind, name: &str) -> bool {
        self.kind == kind && self.name.as_deref() == Some(name)
    }
}

/// Direction of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Towards row zero.
    Up,
    /// Away from row zero.
    Down,
    /// Towards column zero.
    Left,
    /// Away from column zero.
    Right,
}

/// Payload of a `move` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteMove {
    /// Sprite that moved.
    pub name: String,
    /// Step taken.
    pub direction: Direction,
}

/// Payload of a `jump` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteJump {
    /// Sprite that jumped.
    pub name: String,
    /// Landing column.
    pub x: u16,
    /// Landing row.
    pub y: u16,
}

/// Payload of an `add` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteAdd<'a> {
    /// Category of the new sprite.
    pub kind: SpriteKind,
    /// The sprite itself.
    #[serde(flatten)]
    pub sprite: &'a Sprite,
}
