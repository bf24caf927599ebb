//! Listener implementation for daemon TCP endpoints.

use std::collections::HashMap;
use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use wonder_config::SocketEndpoint;

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to a TCP endpoint.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: SocketEndpoint,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl SocketListener {
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let addr = endpoint.resolve().map_err(|source| ListenerError::Resolve {
            host: endpoint.host.clone(),
            port: endpoint.port,
            source,
        })?;
        let listener =
            TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            local_addr,
        })
    }

    /// Address actually bound, which differs from the endpoint for port `0`.
    pub(crate) const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let connections = Arc::new(LiveConnections::default());
        let shutdown_flag = Arc::clone(&shutdown);
        let tracked = Arc::clone(&connections);
        let handle = thread::Builder::new()
            .name("wonderd-accept".to_owned())
            .spawn(move || run_accept_loop(&self, &shutdown_flag, &tracked, &handler))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            shutdown,
            connections,
            handle: Some(handle),
        })
    }
}

/// Streams of connections that are still being served.
#[derive(Debug, Default)]
struct LiveConnections {
    next_id: AtomicU64,
    state: Mutex<Tracked>,
}

#[derive(Debug, Default)]
struct Tracked {
    streams: HashMap<u64, TcpStream>,
    closed: bool,
}

/// Outcome of registering an accepted stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracking {
    Tracked(u64),
    Untracked,
    /// Shutdown already drained the table; the stream was closed instead.
    Refused,
}

impl LiveConnections {
    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.state.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    fn track(&self, stream: &TcpStream) -> Tracking {
        let mut state = self.lock();
        if state.closed {
            drop(state);
            close_stream(stream);
            return Tracking::Refused;
        }
        match stream.try_clone() {
            Ok(clone) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                state.streams.insert(id, clone);
                Tracking::Tracked(id)
            }
            Err(error) => {
                warn!(target: LISTENER_TARGET, %error, "failed to track connection");
                Tracking::Untracked
            }
        }
    }

    fn forget(&self, tracking: Tracking) {
        if let Tracking::Tracked(id) = tracking {
            self.lock().streams.remove(&id);
        }
    }

    fn close_all(&self) -> usize {
        let streams: Vec<TcpStream> = {
            let mut state = self.lock();
            state.closed = true;
            state.streams.drain().map(|(_, stream)| stream).collect()
        };
        for stream in &streams {
            close_stream(stream);
        }
        streams.len()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().streams.len()
    }
}

fn close_stream(stream: &TcpStream) {
    if let Err(error) = stream.shutdown(Shutdown::Both) {
        debug!(target: LISTENER_TARGET, %error, "connection already closed");
    }
}

/// Handle to the background listener thread.
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    connections: Arc<LiveConnections>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Stops accepting and closes every live connection.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let closed = self.connections.close_all();
        if closed > 0 {
            info!(target: LISTENER_TARGET, closed, "closed live connections");
        }
    }

    /// Number of connections currently being served.
    #[cfg(test)]
    pub(crate) fn live_connections(&self) -> usize {
        self.connections.len()
    }

    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => Ok(()),
                Err(_) => Err(ListenerError::ThreadPanic),
            }
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    connections: &Arc<LiveConnections>,
    handler: &Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        local_addr = %listener.local_addr,
        "socket listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match accept_connection(&listener.listener) {
            Ok(Some((stream, peer))) => {
                last_error = None;
                serve(stream, peer, connections, handler);
            }
            Ok(None) => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    info!(target: LISTENER_TARGET, endpoint = %listener.endpoint, "socket listener stopped");
}

fn serve(
    stream: TcpStream,
    peer: SocketAddr,
    connections: &Arc<LiveConnections>,
    handler: &Arc<dyn ConnectionHandler>,
) {
    let tracking = connections.track(&stream);
    if tracking == Tracking::Refused {
        debug!(target: LISTENER_TARGET, %peer, "connection refused during shutdown");
        return;
    }
    let tracked = Arc::clone(connections);
    let handler = Arc::clone(handler);
    let spawned = thread::Builder::new()
        .name(format!("wonderd-conn-{peer}"))
        .spawn(move || {
            debug!(target: LISTENER_TARGET, %peer, "connection accepted");
            handler.handle(stream);
            tracked.forget(tracking);
            debug!(target: LISTENER_TARGET, %peer, "connection finished");
        });
    if let Err(error) = spawned {
        warn!(target: LISTENER_TARGET, %peer, %error, "failed to spawn connection thread");
        connections.forget(tracking);
    }
}

fn accept_connection(listener: &TcpListener) -> Result<Option<(TcpStream, SocketAddr)>, io::Error> {
    match listener.accept() {
        Ok((stream, peer)) => {
            stream.set_nonblocking(false)?;
            Ok(Some((stream, peer)))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}
