//! Serialized response writing shared by a session and its pumps.

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use wonder_proto::{ResponseHeader, encode, encode_header};

use super::DispatchError;

/// Writer that emits each header and optional body as one uninterrupted pair.
#[derive(Clone)]
pub(crate) struct ResponseSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl ResponseSink {
    pub(crate) fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Writes `header`, then `body` when present, then flushes, all under
    /// the writer lock.
    pub(crate) fn send<B>(&self, header: &ResponseHeader, body: Option<&B>) -> Result<(), DispatchError>
    where
        B: Serialize,
    {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        encode(&mut *writer, header, body).map_err(|source| DispatchError::Write {
            sequence: header.sequence,
            source,
        })
    }

    /// Writes a bodiless message.
    pub(crate) fn send_header(&self, header: &ResponseHeader) -> Result<(), DispatchError> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        encode_header(&mut *writer, header).map_err(|source| DispatchError::Write {
            sequence: header.sequence,
            source,
        })
    }
}
