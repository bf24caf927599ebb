//! Sequence-to-handler table shared by callers and the receive loop.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::handler::SeqHandler;

#[derive(Debug, Default)]
struct TableState {
    handlers: HashMap<u64, SeqHandler>,
    closed: bool,
}

/// Mutex-guarded handler map plus the transport's closed flag.
///
/// The flag lives under the same lock as the map, so a registration racing
/// with [`DispatchTable::close`] either lands before the drain or is refused.
#[derive(Debug, Default)]
pub(crate) struct DispatchTable {
    state: Mutex<TableState>,
}

impl DispatchTable {
    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Registers `handler`, handing it back when the table is closed.
    pub(crate) fn register(&self, sequence: u64, handler: SeqHandler) -> Result<(), SeqHandler> {
        let mut state = self.lock();
        if state.closed {
            return Err(handler);
        }
        state.handlers.insert(sequence, handler);
        Ok(())
    }

    /// Removes and returns the handler for `sequence`.
    pub(crate) fn take(&self, sequence: u64) -> Option<SeqHandler> {
        self.lock().handlers.remove(&sequence)
    }

    /// Puts a handler back after it asked for more messages.
    ///
    /// Returns the handler when the table closed while it was out, so the
    /// caller can notify it.
    pub(crate) fn restore(&self, sequence: u64, handler: SeqHandler) -> Option<SeqHandler> {
        self.register(sequence, handler).err()
    }

    /// Marks the table closed and drains every remaining handler.
    pub(crate) fn close(&self) -> Vec<SeqHandler> {
        let mut state = self.lock();
        state.closed = true;
        state.handlers.drain().map(|(_, handler)| handler).collect()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().handlers.len()
    }
}
