use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One item of a `get-info` or `subscribe-events` stream.
///
/// `payload` holds the JSON encoding of the item named by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamItem {
    /// Item kind, one of [`InfoKind`] or [`EventKind`] wire names.
    pub kind: String,
    /// JSON document describing the item.
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
}

impl StreamItem {
    /// Serializes `value` as JSON under `kind`.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when `value` cannot be serialized.
    pub fn json<T: Serialize>(kind: &str, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: kind.to_owned(),
            payload: serde_json::to_vec(value)?,
        })
    }

    /// Terminal item of a `get-info` stream.
    #[must_use]
    pub fn done() -> Self {
        Self {
            kind: InfoKind::Done.as_str().to_owned(),
            payload: b"{}".to_vec(),
        }
    }

    /// Returns `true` for the terminal `done` item.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.kind == InfoKind::Done.as_str()
    }

    /// Decodes the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the payload does not match `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Kinds carried by a `get-info` stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoKind {
    /// The tile grid.
    Tiles,
    /// A tree sprite.
    Trees,
    /// A flower sprite.
    Flowers,
    /// A grass sprite.
    Grass,
    /// A human sprite.
    Human,
    /// An animal sprite.
    Animal,
    /// End of the snapshot.
    Done,
}

impl InfoKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tiles => "tiles",
            Self::Trees => "trees",
            Self::Flowers => "flowers",
            Self::Grass => "grass",
            Self::Human => "human",
            Self::Animal => "animal",
            Self::Done => "done",
        }
    }
}

/// Kinds carried by a `subscribe-events` stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A sprite moved one step.
    Move,
    /// A sprite jumped to a new point.
    Jump,
    /// A sprite was added.
    Add,
    /// A sprite was removed.
    Delete,
}

impl EventKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Jump => "jump",
            Self::Add => "add",
            Self::Delete => "delete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_payload_round_trips() {
        let item = StreamItem::json(EventKind::Jump.as_str(), &json!({"name": "Rabbit", "x": 3}))
            .expect("encode payload");
        assert_eq!(item.kind, "jump");
        let value: serde_json::Value = item.payload_as().expect("decode payload");
        assert_eq!(value["name"], "Rabbit");
    }

    #[test]
    fn done_marks_the_end_of_a_snapshot() {
        assert!(StreamItem::done().is_done());
        let tiles = StreamItem::json(InfoKind::Tiles.as_str(), &Vec::<u8>::new())
            .expect("encode tiles");
        assert!(!tiles.is_done());
    }
}
