//! Millisecond periods that must be non-zero.

use serde::{Deserialize, Deserializer, de::Error as _};

/// Deserializes a millisecond count, rejecting zero.
pub(crate) fn non_zero_millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match u64::deserialize(deserializer)? {
        0 => Err(D::Error::custom("must be at least 1 millisecond")),
        millis => Ok(millis),
    }
}
