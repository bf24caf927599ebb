//! Wire protocol shared by the Wonder daemon, client transport, and CLI.
//!
//! Every message on a connection is a MessagePack header optionally followed
//! by a MessagePack body. Values are self-delimiting, so the stream carries no
//! extra framing:
//!
//! ```text
//! client → server   RequestHeader { sequence, command }  body
//! server → client   ResponseHeader { sequence, error }   [body]
//! ```
//!
//! Simple commands answer with exactly one header and body. Streaming commands
//! answer with a bodiless acknowledgement followed by any number of
//! header-and-item pairs under the same sequence.

mod body;
mod codec;
mod command;
mod header;
mod item;

pub use body::{
    InfoRequest, ListServersRequest, MAX_INFO_ITEMS, MAX_LAND_SPRITES, ListServersResponse, PlantRequest, PlantResponse,
    ReportAliveRequest, ReportAliveResponse, SubscribeRequest,
};
pub use codec::{CodecError, decode, encode, encode_header, skip};
pub use command::{Command, UnknownCommand};
pub use header::{RequestHeader, ResponseHeader};
pub use item::{EventKind, InfoKind, StreamItem};
