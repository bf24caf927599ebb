//! Command routing and stream pumps for one connection.

use std::collections::HashMap;
use std::io::Read;
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use wonder_proto::{
    Command, InfoRequest, ListServersRequest, ListServersResponse, PlantRequest, PlantResponse,
    ReportAliveRequest, ReportAliveResponse, RequestHeader, ResponseHeader, StreamItem,
    SubscribeRequest, decode, skip,
};

use crate::land::{EventQueue, World};

use super::services::not_served;
use super::{DISPATCH_TARGET, DispatchError, ResponseSink, Services};

/// Items a stream pump writes after the acknowledgement.
enum StreamSource {
    /// Finite snapshot ending with `done`.
    Snapshot(Vec<StreamItem>),
    /// Unbounded event feed.
    Events(Arc<EventQueue>),
}

impl StreamSource {
    fn release(&self) {
        if let Self::Events(queue) = self {
            queue.close();
        }
    }
}

/// A registered stream and the thread pumping it.
struct ActiveStream {
    subscription: Option<Arc<EventQueue>>,
    pump: JoinHandle<()>,
}

/// Routing state owned by one connection.
pub(crate) struct Router {
    services: Services,
    sink: ResponseSink,
    control: TcpStream,
    peer: Option<SocketAddr>,
    streams: HashMap<u64, ActiveStream>,
}

impl Router {
    pub(crate) fn new(services: Services, sink: ResponseSink, control: TcpStream) -> Self {
        let peer = control.peer_addr().ok();
        Self {
            services,
            sink,
            control,
            peer,
            streams: HashMap::new(),
        }
    }

    pub(crate) const fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub(crate) const fn services(&self) -> &Services {
        &self.services
    }

    /// Decodes the body named by `header` and answers it.
    pub(crate) fn route<R>(&mut self, header: &RequestHeader, reader: &mut R) -> Result<(), DispatchError>
    where
        R: Read + ?Sized,
    {
        let sequence = header.sequence;
        let command = match Command::parse(&header.command) {
            Ok(command) => command,
            Err(unknown) => {
                skip(reader).map_err(|source| DispatchError::Decode {
                    command: header.command.clone(),
                    source,
                })?;
                debug!(target: DISPATCH_TARGET, sequence, command = %header.command, "unknown command");
                return self
                    .sink
                    .send_header(&ResponseHeader::failure(sequence, unknown.to_string()));
            }
        };
        debug!(target: DISPATCH_TARGET, sequence, %command, "dispatching request");

        match (&self.services, command) {
            (Services::Land(world), Command::Plant) => {
                let request: PlantRequest = read_body(command, reader)?;
                let outcome = world.plant(&request).map_err(|error| error.to_string());
                self.reply(sequence, outcome)
            }
            (Services::Land(world), Command::GetInfo) => {
                let _: InfoRequest = read_body(command, reader)?;
                let world = Arc::clone(world);
                self.open_stream(sequence, move || {
                    world
                        .snapshot()
                        .map(StreamSource::Snapshot)
                        .map_err(|error| error.to_string())
                })
            }
            (Services::Land(world), Command::SubscribeEvents) => {
                let _: SubscribeRequest = read_body(command, reader)?;
                let world = Arc::clone(world);
                self.open_stream(sequence, move || Ok(StreamSource::Events(world.subscribe())))
            }
            (Services::Stage(registry), Command::ListServers) => {
                let _: ListServersRequest = read_body(command, reader)?;
                let members = registry.list_alive();
                self.reply(sequence, Ok(ListServersResponse { members }))
            }
            (Services::Stage(registry), Command::ReportAlive) => {
                let request: ReportAliveRequest = read_body(command, reader)?;
                let message = registry.report_alive(&request.member_address);
                self.reply(sequence, Ok(ReportAliveResponse { message }))
            }
            _ => self.refuse(sequence, command, reader),
        }
    }

    /// Answers a known command this daemon role does not serve.
    fn refuse<R>(&self, sequence: u64, command: Command, reader: &mut R) -> Result<(), DispatchError>
    where
        R: Read + ?Sized,
    {
        let header = ResponseHeader::failure(sequence, not_served(command));
        debug!(target: DISPATCH_TARGET, sequence, %command, role = %self.services.role(), "command not served");
        match command {
            Command::Plant => {
                let _: PlantRequest = read_body(command, reader)?;
                self.sink.send(&header, Some(&PlantResponse::default()))
            }
            Command::GetInfo => {
                let _: InfoRequest = read_body(command, reader)?;
                self.sink.send_header(&header)
            }
            Command::SubscribeEvents => {
                let _: SubscribeRequest = read_body(command, reader)?;
                self.sink.send_header(&header)
            }
            Command::ListServers => {
                let _: ListServersRequest = read_body(command, reader)?;
                self.sink.send(&header, Some(&ListServersResponse::default()))
            }
            Command::ReportAlive => {
                let _: ReportAliveRequest = read_body(command, reader)?;
                self.sink.send(&header, Some(&ReportAliveResponse::default()))
            }
        }
    }

    /// Writes the single reply of a simple command. A failed call still
    /// carries a default body so the client decodes one value either way.
    fn reply<T>(&self, sequence: u64, outcome: Result<T, String>) -> Result<(), DispatchError>
    where
        T: Serialize + Default,
    {
        match outcome {
            Ok(body) => self.sink.send(&ResponseHeader::ok(sequence), Some(&body)),
            Err(message) => {
                debug!(target: DISPATCH_TARGET, sequence, error = %message, "call failed");
                self.sink
                    .send(&ResponseHeader::failure(sequence, message), Some(&T::default()))
            }
        }
    }

    /// Acknowledges a streaming command and starts its pump.
    fn open_stream<F>(&mut self, sequence: u64, source: F) -> Result<(), DispatchError>
    where
        F: FnOnce() -> Result<StreamSource, String>,
    {
        self.reap_finished();
        if self.streams.contains_key(&sequence) {
            warn!(target: DISPATCH_TARGET, sequence, peer = ?self.peer, "duplicate stream sequence");
            return self.sink.send_header(&ResponseHeader::failure(
                sequence,
                format!("stream with sequence {sequence} already exists"),
            ));
        }
        let source = match source() {
            Ok(source) => source,
            Err(message) => {
                return self
                    .sink
                    .send_header(&ResponseHeader::failure(sequence, message));
            }
        };
        if let Err(error) = self.sink.send_header(&ResponseHeader::ok(sequence)) {
            source.release();
            return Err(error);
        }
        let subscription = match &source {
            StreamSource::Events(queue) => Some(Arc::clone(queue)),
            StreamSource::Snapshot(_) => None,
        };
        let sink = self.sink.clone();
        let spawned = thread::Builder::new()
            .name(format!("wonderd-pump-{sequence}"))
            .spawn(move || pump(&sink, sequence, source));
        let pump = match spawned {
            Ok(pump) => pump,
            Err(source) => {
                if let Some(queue) = subscription {
                    queue.close();
                }
                return Err(DispatchError::Spawn { sequence, source });
            }
        };
        self.streams.insert(sequence, ActiveStream { subscription, pump });
        Ok(())
    }

    /// Joins pumps that have already returned and forgets their sequences.
    fn reap_finished(&mut self) {
        let finished: Vec<u64> = self
            .streams
            .iter()
            .filter(|(_, stream)| stream.pump.is_finished())
            .map(|(sequence, _)| *sequence)
            .collect();
        for sequence in finished {
            if let Some(stream) = self.streams.remove(&sequence) {
                self.join(sequence, stream);
            }
        }
    }

    fn join(&self, sequence: u64, stream: ActiveStream) {
        if stream.pump.join().is_err() {
            warn!(target: DISPATCH_TARGET, sequence, peer = ?self.peer, "stream pump panicked");
        }
    }

    /// Releases subscriptions, closes the socket, and waits for every pump.
    pub(crate) fn finish(&mut self) {
        for stream in self.streams.values() {
            if let Some(queue) = &stream.subscription {
                queue.close();
            }
        }
        if let Err(error) = self.control.shutdown(Shutdown::Both) {
            debug!(target: DISPATCH_TARGET, %error, "connection already closed");
        }
        let streams: Vec<(u64, ActiveStream)> = self.streams.drain().collect();
        for (sequence, stream) in streams {
            self.join(sequence, stream);
        }
    }
}

fn read_body<T, R>(command: Command, reader: &mut R) -> Result<T, DispatchError>
where
    T: DeserializeOwned,
    R: Read + ?Sized,
{
    decode(reader).map_err(|source| DispatchError::Decode {
        command: command.as_str().to_owned(),
        source,
    })
}

fn pump(sink: &ResponseSink, sequence: u64, source: StreamSource) {
    let header = ResponseHeader::ok(sequence);
    match source {
        StreamSource::Snapshot(items) => {
            for item in items {
                if let Err(error) = sink.send(&header, Some(&item)) {
                    debug!(target: DISPATCH_TARGET, sequence, %error, "info stream ended early");
                    return;
                }
                if item.is_done() {
                    break;
                }
            }
            debug!(target: DISPATCH_TARGET, sequence, "info stream complete");
        }
        StreamSource::Events(queue) => {
            while let Some(item) = queue.pop() {
                if let Err(error) = sink.send(&header, Some(&item)) {
                    debug!(target: DISPATCH_TARGET, sequence, %error, "event stream ended");
                    queue.close();
                    return;
                }
            }
            debug!(target: DISPATCH_TARGET, sequence, "event stream closed");
        }
    }
}
