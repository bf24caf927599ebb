//! Connection handler that runs a dispatch session per connection.

use std::net::TcpStream;

use tracing::warn;

use crate::transport::ConnectionHandler;

use super::{DISPATCH_TARGET, Services, Session};

/// Serves every accepted connection with the daemon's services.
pub(crate) struct DispatchConnectionHandler {
    services: Services,
}

impl DispatchConnectionHandler {
    pub(crate) const fn new(services: Services) -> Self {
        Self { services }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, stream: TcpStream) {
        match Session::open(self.services.clone(), stream) {
            Ok(session) => session.run(),
            Err(error) => warn!(target: DISPATCH_TARGET, %error, "failed to open session"),
        }
    }
}
