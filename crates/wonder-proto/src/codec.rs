//! MessagePack framing for headers and bodies.
//!
//! A header and its body are two independent values. Decoding the wrong body
//! type desynchronises the stream, so callers that cannot interpret a body
//! must [`skip`] it or drop the connection.

use std::io::{self, Read, Write};

use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;

/// Errors raised while reading or writing protocol values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The peer closed the connection before the next value started.
    #[error("peer disconnected")]
    Disconnected,
    /// The bytes on the wire were not the expected value.
    #[error("failed to decode message: {0}")]
    Decode(#[source] rmp_serde::decode::Error),
    /// A value could not be serialized or written.
    #[error("failed to encode message: {0}")]
    Encode(#[source] rmp_serde::encode::Error),
    /// Flushing the writer failed.
    #[error("failed to flush message: {0}")]
    Flush(#[source] io::Error),
}

impl CodecError {
    /// Returns `true` when the error signals a clean end of stream.
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected)
    }

    fn from_decode(error: rmp_serde::decode::Error) -> Self {
        match &error {
            rmp_serde::decode::Error::InvalidMarkerRead(io_error)
                if is_disconnect_kind(io_error.kind()) =>
            {
                Self::Disconnected
            }
            _ => Self::Decode(error),
        }
    }
}

fn is_disconnect_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}

/// Writes `header`, then `body` when present, then flushes.
///
/// Struct fields are encoded by name so peers can add fields without breaking
/// older readers.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] when serialization or the write fails and
/// [`CodecError::Flush`] when the final flush fails.
pub fn encode<W, H, B>(writer: &mut W, header: &H, body: Option<&B>) -> Result<(), CodecError>
where
    W: Write + ?Sized,
    H: Serialize + ?Sized,
    B: Serialize + ?Sized,
{
    rmp_serde::encode::write_named(writer, header).map_err(CodecError::Encode)?;
    if let Some(body) = body {
        rmp_serde::encode::write_named(writer, body).map_err(CodecError::Encode)?;
    }
    writer.flush().map_err(CodecError::Flush)
}

/// Writes a bodiless message such as a stream acknowledgement.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_header<W, H>(writer: &mut W, header: &H) -> Result<(), CodecError>
where
    W: Write + ?Sized,
    H: Serialize + ?Sized,
{
    encode::<W, H, ()>(writer, header, None)
}

/// Reads exactly one value of type `T`.
///
/// # Errors
///
/// Returns [`CodecError::Disconnected`] when the stream ends before the value
/// starts and [`CodecError::Decode`] for anything else.
pub fn decode<T, R>(reader: &mut R) -> Result<T, CodecError>
where
    T: DeserializeOwned,
    R: Read + ?Sized,
{
    rmp_serde::from_read(reader).map_err(CodecError::from_decode)
}

/// Consumes and discards one value.
///
/// # Errors
///
/// See [`decode`].
pub fn skip<R>(reader: &mut R) -> Result<(), CodecError>
where
    R: Read + ?Sized,
{
    decode::<IgnoredAny, R>(reader).map(|_| ())
}
