use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Line format of the daemon's log output.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, with fields flattened.
    #[default]
    Json,
    /// Single-line text for terminals.
    Compact,
}

/// Error returned when `--log-format` names no known format.
pub type LogFormatParseError = strum::ParseError;
