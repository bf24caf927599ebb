//! Per-sequence response handlers.
//!
//! Handlers run on the receive loop thread. Each one decodes exactly the body
//! its command carries so the stream stays aligned, then hands the result to
//! the caller without blocking.

use std::io::Read;
use std::sync::mpsc::{SyncSender, TrySendError};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use wonder_proto::{
    CodecError, Command, ListServersResponse, PlantResponse, ReportAliveResponse, ResponseHeader,
    StreamItem, decode,
};

use crate::CLIENT_TARGET;
use crate::errors::CallError;

/// Outcome of a single-response call.
pub type Reply<T> = Result<T, CallError>;

/// Whether a handler expects further messages under its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    Keep,
    Done,
}

/// Handler registered under one sequence.
#[derive(Debug)]
pub(crate) enum SeqHandler {
    Plant(ReplySlot<PlantResponse>),
    ListServers(ReplySlot<ListServersResponse>),
    ReportAlive(ReplySlot<ReportAliveResponse>),
    Info(StreamSlot),
    Events(StreamSlot),
}

impl SeqHandler {
    /// Consumes one message addressed to this handler.
    pub(crate) fn on_message<R: Read + ?Sized>(
        &mut self,
        header: &ResponseHeader,
        reader: &mut R,
    ) -> Result<Disposition, CodecError> {
        match self {
            Self::Plant(slot) => slot.deliver(header, reader),
            Self::ListServers(slot) => slot.deliver(header, reader),
            Self::ReportAlive(slot) => slot.deliver(header, reader),
            Self::Info(slot) | Self::Events(slot) => slot.deliver(header, reader),
        }
    }

    /// Notifies the caller that no further messages will arrive.
    pub(crate) fn on_close(self) {
        match self {
            Self::Plant(slot) => slot.close(),
            Self::ListServers(slot) => slot.close(),
            Self::ReportAlive(slot) => slot.close(),
            Self::Info(slot) | Self::Events(slot) => slot.close(),
        }
    }
}

/// Delivers exactly one reply into a caller-owned channel.
#[derive(Debug)]
pub(crate) struct ReplySlot<T> {
    command: Command,
    sequence: u64,
    replies: SyncSender<Reply<T>>,
}

impl<T: DeserializeOwned> ReplySlot<T> {
    pub(crate) const fn new(command: Command, sequence: u64, replies: SyncSender<Reply<T>>) -> Self {
        Self {
            command,
            sequence,
            replies,
        }
    }

    fn deliver<R: Read + ?Sized>(
        &self,
        header: &ResponseHeader,
        reader: &mut R,
    ) -> Result<Disposition, CodecError> {
        let body: T = decode(reader)?;
        let reply = if header.is_error() {
            Err(CallError::Remote(header.error.clone()))
        } else {
            Ok(body)
        };
        self.offer(reply);
        Ok(Disposition::Done)
    }

    fn close(self) {
        self.offer(Err(CallError::Closed));
    }

    fn offer(&self, reply: Reply<T>) {
        match self.replies.try_send(reply) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => warn!(
                target: CLIENT_TARGET,
                command = %self.command,
                sequence = self.sequence,
                "reply channel full; dropping reply"
            ),
            Err(TrySendError::Disconnected(_)) => debug!(
                target: CLIENT_TARGET,
                command = %self.command,
                sequence = self.sequence,
                "reply receiver dropped"
            ),
        }
    }
}

/// Acknowledgement followed by a stream of items.
#[derive(Debug)]
pub(crate) struct StreamSlot {
    command: Command,
    sequence: u64,
    ack: Option<SyncSender<Result<(), CallError>>>,
    items: SyncSender<StreamItem>,
}

impl StreamSlot {
    pub(crate) const fn new(
        command: Command,
        sequence: u64,
        ack: SyncSender<Result<(), CallError>>,
        items: SyncSender<StreamItem>,
    ) -> Self {
        Self {
            command,
            sequence,
            ack: Some(ack),
            items,
        }
    }

    fn deliver<R: Read + ?Sized>(
        &mut self,
        header: &ResponseHeader,
        reader: &mut R,
    ) -> Result<Disposition, CodecError> {
        if let Some(ack) = self.ack.take() {
            let outcome = if header.is_error() {
                Err(CallError::Remote(header.error.clone()))
            } else {
                Ok(())
            };
            let rejected = outcome.is_err();
            if ack.try_send(outcome).is_err() {
                debug!(
                    target: CLIENT_TARGET,
                    command = %self.command,
                    sequence = self.sequence,
                    "caller stopped waiting for acknowledgement"
                );
            }
            return Ok(if rejected {
                Disposition::Done
            } else {
                Disposition::Keep
            });
        }

        let item: StreamItem = decode(reader)?;
        let finished = self.command == Command::GetInfo && item.is_done();
        match self.items.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(item)) => warn!(
                target: CLIENT_TARGET,
                command = %self.command,
                sequence = self.sequence,
                kind = %item.kind,
                "item channel full; dropping item"
            ),
            Err(TrySendError::Disconnected(_)) => debug!(
                target: CLIENT_TARGET,
                command = %self.command,
                sequence = self.sequence,
                "item receiver dropped"
            ),
        }

        Ok(if finished {
            Disposition::Done
        } else {
            Disposition::Keep
        })
    }

    fn close(self) {
        let Some(ack) = self.ack else {
            return;
        };
        if ack.try_send(Err(CallError::Closed)).is_err() {
            debug!(
                target: CLIENT_TARGET,
                command = %self.command,
                sequence = self.sequence,
                "caller stopped waiting for acknowledgement"
            );
        }
    }
}
