//! Shared TCP listening socket.
//!
//! # Responsibilities
//! - Bind the configured port on all interfaces with `SO_REUSEADDR`
//! - Listen with a fixed backlog
//! - Hand out duplicated descriptors so every worker can accept on the
//!   same socket
//!
//! The socket is held in std (non-blocking) form; each worker registers its
//! own duplicate with its own runtime. The kernel serializes individual
//! accepts, so connections spread non-deterministically across workers.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;

/// Listen backlog for the shared socket.
pub const LISTEN_BACKLOG: i32 = 1024;

/// Error type for listener setup.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to create listening socket: {0}")]
    Socket(#[source] io::Error),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to listen: {0}")]
    Listen(#[source] io::Error),
}

/// The one listening socket shared by all workers.
#[derive(Debug)]
pub struct SharedListener {
    inner: std::net::TcpListener,
    local_addr: SocketAddr,
}

impl SharedListener {
    /// Bind `0.0.0.0:port`.
    pub fn bind(port: u16) -> Result<Self, ListenerError> {
        Self::bind_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
    }

    /// Bind `addr` with `SO_REUSEADDR` and start listening.
    ///
    /// Needs no runtime, so it is safe to call from synchronous and async
    /// contexts alike.
    pub fn bind_addr(addr: SocketAddr) -> Result<Self, ListenerError> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(ListenerError::Socket)?;

        socket.set_reuse_address(true).map_err(ListenerError::Socket)?;
        socket
            .bind(&addr.into())
            .map_err(|source| ListenerError::Bind { addr, source })?;
        socket.listen(LISTEN_BACKLOG).map_err(ListenerError::Listen)?;
        // Workers register their duplicates with tokio, which requires non-blocking mode.
        socket.set_nonblocking(true).map_err(ListenerError::Socket)?;

        let inner = std::net::TcpListener::from(socket);
        let local_addr = inner.local_addr().map_err(ListenerError::Socket)?;

        tracing::debug!(address = %local_addr, backlog = LISTEN_BACKLOG, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Duplicate the descriptor for one worker. The duplicate is non-blocking.
    pub fn try_clone_std(&self) -> io::Result<std::net::TcpListener> {
        self.inner.try_clone()
    }

    /// Address the socket is bound to, with the real port when 0 was asked for.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_ephemeral_port() {
        let listener = SharedListener::bind(0).unwrap();
        assert_ne!(listener.local_addr().port(), 0);
        assert!(listener.local_addr().ip().is_unspecified());
    }

    #[test]
    fn port_in_use_is_a_bind_error() {
        let first = SharedListener::bind(0).unwrap();
        let err = SharedListener::bind(first.local_addr().port()).unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }

    #[tokio::test]
    async fn binds_inside_a_runtime() {
        let listener = SharedListener::bind(0).unwrap();
        let accepting = tokio::net::TcpListener::from_std(listener.try_clone_std().unwrap()).unwrap();

        let port = listener.local_addr().port();
        let (connected, accepted) =
            tokio::join!(tokio::net::TcpStream::connect(("127.0.0.1", port)), accepting.accept());
        connected.unwrap();
        accepted.unwrap();
    }

    #[tokio::test]
    async fn bind_error_inside_a_runtime_is_returned() {
        let first = SharedListener::bind(0).unwrap();
        let err = SharedListener::bind(first.local_addr().port()).unwrap_err();
        assert!(matches!(err, ListenerError::Bind { .. }));
    }

    #[test]
    fn clones_share_the_port() {
        let listener = SharedListener::bind(0).unwrap();
        let clone = listener.try_clone_std().unwrap();
        assert_eq!(clone.local_addr().unwrap(), listener.local_addr());
    }
}
