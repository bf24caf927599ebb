use std::io::BufReader;
use std::io::BufWriter;
use std::net::TcpStream;

use tracing::{debug, warn};

use wonder_proto::{RequestHeader, decode};

use super::router::Router;
use super::{DISPATCH_TARGET, DispatchError, ResponseSink, Services};

/// One connection's request loop.
pub(crate) struct Session {
    reader: BufReader<TcpStream>,
    router: Router,
}

impl Session {
    /// Prepares a session over `stream`.
    pub(crate) fn open(services: Services, stream: TcpStream) -> Result<Self, DispatchError> {
        let writer = stream.try_clone().map_err(DispatchError::Socket)?;
        let control = stream.try_clone().map_err(DispatchError::Socket)?;
        Ok(Self {
            reader: BufReader::new(stream),
            router: Router::new(services, ResponseSink::new(BufWriter::new(writer)), control),
        })
    }

    /// Serves requests until the peer disconnects or the stream breaks.
    pub(crate) fn run(mut self) {
        let peer = self.router.peer();
        debug!(
            target: DISPATCH_TARGET,
            peer = ?peer,
            role = %self.router.services().role(),
            "session started"
        );
        loop {
            let header: RequestHeader = match decode(&mut self.reader) {
                Ok(header) => header,
                Err(error) if error.is_disconnect() => {
                    debug!(target: DISPATCH_TARGET, peer = ?peer, "peer disconnected");
                    break;
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, peer = ?peer, %error, "failed to decode request header");
                    break;
                }
            };
            if let Err(error) = self.router.route(&header, &mut self.reader) {
                warn!(
                    target: DISPATCH_TARGET,
                    peer = ?peer,
                    sequence = header.sequence,
                    %error,
                    "ending session"
                );
                break;
            }
        }
        self.router.finish();
        debug!(target: DISPATCH_TARGET, peer = ?peer, "session finished");
    }
}
