//! Rendering of daemon replies as human text or JSON lines.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use wonder_proto::{ListServersResponse, PlantResponse, ReportAliveResponse, StreamItem};

use crate::errors::AppError;

/// Output format selection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Selects `human` for terminal output and `json` for redirected output.
    #[default]
    Auto,
    /// Always render human-readable output.
    Human,
    /// Always emit one JSON document per line.
    Json,
}

/// Output format after resolving `auto` against the terminal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolvedOutputFormat {
    /// Human-readable text.
    Human,
    /// JSON lines.
    Json,
}

impl OutputFormat {
    /// Resolves the output format based on whether stdout is a terminal.
    #[must_use]
    pub const fn resolve(self, stdout_is_terminal: bool) -> ResolvedOutputFormat {
        match self {
            Self::Auto if stdout_is_terminal => ResolvedOutputFormat::Human,
            Self::Auto | Self::Json => ResolvedOutputFormat::Json,
            Self::Human => ResolvedOutputFormat::Human,
        }
    }
}

#[derive(Serialize)]
struct ItemLine<'a> {
    kind: &'a str,
    payload: Value,
}

/// Writes replies to stdout in the resolved format.
pub(crate) struct Renderer<'a, W: Write> {
    out: &'a mut W,
    format: ResolvedOutputFormat,
}

impl<'a, W: Write> Renderer<'a, W> {
    pub(crate) const fn new(out: &'a mut W, format: ResolvedOutputFormat) -> Self {
        Self { out, format }
    }

    pub(crate) fn plant(&mut self, response: &PlantResponse) -> Result<(), AppError> {
        match self.format {
            ResolvedOutputFormat::Json => self.json(response),
            ResolvedOutputFormat::Human => self.line(&format!(
                "planted {} ({} failed)",
                response.succeeded, response.failed
            )),
        }
    }

    pub(crate) fn item(&mut self, item: &StreamItem) -> Result<(), AppError> {
        let payload: Value = item.payload_as().map_err(|source| AppError::DecodePayload {
            kind: item.kind.clone(),
            source,
        })?;
        match self.format {
            ResolvedOutputFormat::Json => self.json(&ItemLine {
                kind: &item.kind,
                payload,
            }),
            ResolvedOutputFormat::Human => self.line(&describe(&item.kind, &payload)),
        }
    }

    pub(crate) fn members(&mut self, response: &ListServersResponse) -> Result<(), AppError> {
        match self.format {
            ResolvedOutputFormat::Json => self.json(response),
            ResolvedOutputFormat::Human if response.members.is_empty() => {
                self.line("no servers are alive")
            }
            ResolvedOutputFormat::Human => response
                .members
                .iter()
                .try_for_each(|member| self.line(member)),
        }
    }

    pub(crate) fn acknowledgement(
        &mut self,
        response: &ReportAliveResponse,
    ) -> Result<(), AppError> {
        match self.format {
            ResolvedOutputFormat::Json => self.json(response),
            ResolvedOutputFormat::Human => self.line(&response.message),
        }
    }

    fn json<T: Serialize>(&mut self, value: &T) -> Result<(), AppError> {
        serde_json::to_writer(&mut *self.out, value).map_err(AppError::SerialiseOutput)?;
        self.finish_line()
    }

    fn line(&mut self, text: &str) -> Result<(), AppError> {
        self.out
            .write_all(text.as_bytes())
            .map_err(AppError::WriteOutput)?;
        self.finish_line()
    }

    // Streams are followed live, so every line is flushed as it is written.
    fn finish_line(&mut self) -> Result<(), AppError> {
        self.out.write_all(b"\n").map_err(AppError::WriteOutput)?;
        self.out.flush().map_err(AppError::WriteOutput)
    }
}

/// One-line summary of a stream item.
fn describe(kind: &str, payload: &Value) -> String {
    if kind == "tiles" {
        return describe_tiles(payload);
    }
    let mut text = kind.to_owned();
    for field in ["kind", "name"] {
        if let Some(value) = payload.get(field).and_then(Value::as_str) {
            text.push(' ');
            text.push_str(value);
        }
    }
    if let (Some(x), Some(y)) = (payload.get("x"), payload.get("y")) {
        text.push_str(&format!(" at ({x}, {y})"));
    }
    if let Some(direction) = payload.get("direction").and_then(Value::as_str) {
        text.push(' ');
        text.push_str(direction);
    }
    if let Some(color) = payload.get("color").and_then(Value::as_str) {
        text.push_str(&format!(" [{color}]"));
    }
    text
}

fn describe_tiles(payload: &Value) -> String {
    let rows = payload.as_array().map_or(&[][..], Vec::as_slice);
    let cols = rows
        .first()
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    let mut text = format!("tiles {}x{cols}", rows.len());
    for row in rows {
        text.push('\n');
        let cells = row.as_array().map_or(&[][..], Vec::as_slice);
        text.extend(cells.iter().map(|cell| {
            match cell.get("gradient").and_then(Value::as_u64) {
                Some(0) => '.',
                Some(_) => '#',
                None => '?',
            }
        }));
    }
    text
}
