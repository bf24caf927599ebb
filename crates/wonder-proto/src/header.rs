use serde::{Deserialize, Serialize};

/// Header preceding every request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    /// Per-connection correlation identifier chosen by the client.
    pub sequence: u64,
    /// Wire name of the command, see [`crate::Command`].
    pub command: String,
}

impl RequestHeader {
    /// Builds a header for `command` under `sequence`.
    #[must_use]
    pub fn new(sequence: u64, command: impl Into<String>) -> Self {
        Self {
            sequence,
            command: command.into(),
        }
    }
}

/// Header preceding every response, acknowledgement, and stream item.
///
/// An empty `error` means success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// Sequence of the request this message answers.
    pub sequence: u64,
    /// Remote error text; empty on success.
    #[serde(default)]
    pub error: String,
}

impl ResponseHeader {
    /// Successful header for `sequence`.
    #[must_use]
    pub const fn ok(sequence: u64) -> Self {
        Self {
            sequence,
            error: String::new(),
        }
    }

    /// Failed header for `sequence` carrying `error`.
    #[must_use]
    pub fn failure(sequence: u64, error: impl Into<String>) -> Self {
        Self {
            sequence,
            error: error.into(),
        }
    }

    /// Returns `true` when the remote side reported an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}
