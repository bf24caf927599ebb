use thiserror::Error;

/// Errors reported by land operations.
#[derive(Debug, Error)]
pub enum WorldError {
    /// `plant` named a kind the land cannot grow.
    #[error("unknown plant kind '{what}'")]
    UnknownPlant {
        /// Requested kind.
        what: String,
    },
    /// `plant` asked for more sprites than the land holds.
    #[error("cannot plant {requested} sprites: the land holds at most {limit} and has {present}")]
    Overcrowded {
        /// Sprites requested by the call.
        requested: u32,
        /// Sprites already on the land.
        present: usize,
        /// Upper bound on sprites.
        limit: usize,
    },
    /// An item payload could not be encoded.
    #[error("failed to encode land item: {0}")]
    Encode(#[from] serde_json::Error),
}
