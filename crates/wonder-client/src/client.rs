//! Connection ownership, calling conventions, and the receive loop.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};
use wonder_config::SocketEndpoint;
use wonder_proto::{
    Command, InfoRequest, ListServersRequest, ListServersResponse, PlantRequest, PlantResponse,
    ReportAliveRequest, ReportAliveResponse, RequestHeader, ResponseHeader, StreamItem,
    SubscribeRequest, decode, encode,
};

use crate::CLIENT_TARGET;
use crate::dispatch::DispatchTable;
use crate::errors::{CallError, ClientError};
use crate::handler::{Disposition, Reply, ReplySlot, SeqHandler, StreamSlot};

#[derive(Debug)]
struct Shared {
    peer: SocketAddr,
    next_sequence: AtomicU64,
    writer: Mutex<BufWriter<TcpStream>>,
    socket: TcpStream,
    table: DispatchTable,
}

impl Shared {
    fn writer(&self) -> MutexGuard<'_, BufWriter<TcpStream>> {
        self.writer.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    fn shutdown(&self) {
        if let Err(error) = self.socket.shutdown(Shutdown::Both) {
            debug!(target: CLIENT_TARGET, peer = %self.peer, %error, "socket already shut down");
        }
        for handler in self.table.close() {
            handler.on_close();
        }
    }
}

/// Client end of one Wonder connection.
///
/// Calls may be issued from any number of threads. Dropping the client
/// closes the connection and fails every pending wait.
#[derive(Debug)]
pub struct RpcClient {
    shared: Arc<Shared>,
    receiver: Option<JoinHandle<()>>,
}

impl RpcClient {
    /// Dials `endpoint` and starts the receive loop.
    ///
    /// `timeout` bounds the dial and every subsequent write.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot be resolved or dialled, or
    /// when the socket cannot be prepared.
    pub fn connect(endpoint: &SocketEndpoint, timeout: Duration) -> Result<Self, ClientError> {
        let address = endpoint.resolve().map_err(|source| ClientError::Resolve {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let stream = TcpStream::connect_timeout(&address, timeout).map_err(|source| {
            ClientError::Connect {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(ClientError::Socket)?;
        stream.set_nodelay(true).map_err(ClientError::Socket)?;

        let reader = stream.try_clone().map_err(ClientError::Socket)?;
        let socket = stream.try_clone().map_err(ClientError::Socket)?;
        let shared = Arc::new(Shared {
            peer: address,
            next_sequence: AtomicU64::new(1),
            writer: Mutex::new(BufWriter::new(stream)),
            socket,
            table: DispatchTable::default(),
        });

        let loop_shared = Arc::clone(&shared);
        let receiver = thread::Builder::new()
            .name("wonder-client-recv".to_owned())
            .spawn(move || receive_loop(&loop_shared, BufReader::new(reader)))
            .map_err(ClientError::SpawnReceiver)?;

        info!(target: CLIENT_TARGET, peer = %address, "connected");
        Ok(Self {
            shared,
            receiver: Some(receiver),
        })
    }

    /// Address of the connected peer.
    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.shared.peer
    }

    /// Returns `true` once the transport has closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.table.is_closed()
    }

    /// Asks a land daemon to plant sprites.
    ///
    /// The reply arrives on `replies`; it is dropped if the channel is full.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be sent.
    pub fn plant(
        &self,
        request: &PlantRequest,
        replies: SyncSender<Reply<PlantResponse>>,
    ) -> Result<u64, ClientError> {
        self.call(Command::Plant, request, |sequence| {
            SeqHandler::Plant(ReplySlot::new(Command::Plant, sequence, replies))
        })
    }

    /// Asks the stage for its alive members.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be sent.
    pub fn list_servers(
        &self,
        replies: SyncSender<Reply<ListServersResponse>>,
    ) -> Result<u64, ClientError> {
        self.call(Command::ListServers, &ListServersRequest {}, |sequence| {
            SeqHandler::ListServers(ReplySlot::new(Command::ListServers, sequence, replies))
        })
    }

    /// Reports `member_address` alive to the stage.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be sent.
    pub fn report_alive(
        &self,
        member_address: &str,
        replies: SyncSender<Reply<ReportAliveResponse>>,
    ) -> Result<u64, ClientError> {
        let request = ReportAliveRequest {
            member_address: member_address.to_owned(),
        };
        self.call(Command::ReportAlive, &request, |sequence| {
            SeqHandler::ReportAlive(ReplySlot::new(Command::ReportAlive, sequence, replies))
        })
    }

    /// Opens a land snapshot stream.
    ///
    /// Blocks until the daemon acknowledges. Items, ending with `done`, then
    /// arrive on `items`; the sender is dropped after `done`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Rejected`] when the acknowledgement carries an
    /// error and [`ClientError::Closed`] when the connection ends first.
    pub fn info(&self, items: SyncSender<StreamItem>) -> Result<u64, ClientError> {
        self.open_stream(Command::GetInfo, &InfoRequest {}, items, SeqHandler::Info)
    }

    /// Opens a land event stream.
    ///
    /// Blocks until the daemon acknowledges. Events then arrive on `items`
    /// until the connection closes.
    ///
    /// # Errors
    ///
    /// See [`RpcClient::info`].
    pub fn subscribe(&self, items: SyncSender<StreamItem>) -> Result<u64, ClientError> {
        self.open_stream(
            Command::SubscribeEvents,
            &SubscribeRequest {},
            items,
            SeqHandler::Events,
        )
    }

    fn open_stream<B: Serialize>(
        &self,
        command: Command,
        body: &B,
        items: SyncSender<StreamItem>,
        variant: fn(StreamSlot) -> SeqHandler,
    ) -> Result<u64, ClientError> {
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        let sequence = self.call(command, body, |sequence| {
            variant(StreamSlot::new(command, sequence, ack_tx, items))
        })?;
        match ack_rx.recv() {
            Ok(Ok(())) => Ok(sequence),
            Ok(Err(error)) => Err(ClientError::from_call(command, error)),
            Err(_) => Err(ClientError::from_call(command, CallError::Closed)),
        }
    }

    /// Sends `command` with `body` under a fresh sequence.
    ///
    /// The handler built by `make_handler` is registered before the request
    /// is written and removed again, unused, if the write fails.
    pub(crate) fn call<B, F>(
        &self,
        command: Command,
        body: &B,
        make_handler: F,
    ) -> Result<u64, ClientError>
    where
        B: Serialize + ?Sized,
        F: FnOnce(u64) -> SeqHandler,
    {
        if self.shared.table.is_closed() {
            return Err(ClientError::Closed);
        }

        let mut writer = self.shared.writer();
        let sequence = self.shared.next_sequence.fetch_add(1, Ordering::Relaxed);
        if self
            .shared
            .table
            .register(sequence, make_handler(sequence))
            .is_err()
        {
            return Err(ClientError::Closed);
        }

        let header = RequestHeader::new(sequence, command.as_str());
        if let Err(source) = encode(&mut *writer, &header, Some(body)) {
            drop(self.shared.table.take(sequence));
            warn!(target: CLIENT_TARGET, %command, sequence, error = %source, "send failed");
            return Err(ClientError::Send { command, source });
        }

        debug!(target: CLIENT_TARGET, %command, sequence, "request sent");
        Ok(sequence)
    }

    /// Shuts the connection down and fails every pending wait.
    ///
    /// Idempotent.
    pub fn close(&self) {
        self.shared.shutdown();
    }
}

impl Drop for RpcClient {
    fn drop(&mut self) {
        self.close();
        let Some(receiver) = self.receiver.take() else {
            return;
        };
        if receiver.join().is_err() {
            warn!(target: CLIENT_TARGET, "receive loop panicked");
        }
    }
}

fn receive_loop(shared: &Shared, mut reader: BufReader<TcpStream>) {
    loop {
        let header: ResponseHeader = match decode(&mut reader) {
            Ok(header) => header,
            Err(error) if error.is_disconnect() => {
                debug!(target: CLIENT_TARGET, peer = %shared.peer, "server closed connection");
                break;
            }
            Err(error) => {
                if !shared.table.is_closed() {
                    warn!(target: CLIENT_TARGET, peer = %shared.peer, %error, "failed to read response header");
                }
                break;
            }
        };

        let sequence = header.sequence;
        let Some(mut handler) = shared.table.take(sequence) else {
            debug!(target: CLIENT_TARGET, sequence, "no handler for sequence; ignoring");
            continue;
        };

        match handler.on_message(&header, &mut reader) {
            Ok(Disposition::Keep) => {
                if let Some(handler) = shared.table.restore(sequence, handler) {
                    handler.on_close();
                }
            }
            Ok(Disposition::Done) => {}
            Err(error) => {
                warn!(target: CLIENT_TARGET, sequence, %error, "failed to read response body");
                handler.on_close();
                break;
            }
        }
    }

    shared.shutdown();
    debug!(target: CLIENT_TARGET, peer = %shared.peer, "receive loop stopped");
}
