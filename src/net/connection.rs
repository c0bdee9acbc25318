//! Per-connection handling.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Read once from the peer with a bounded wait
//! - Answer a successful read with the canned liveness reply
//! - Close the socket on every exit path
//!
//! A timed-out or failed read closes the connection without writing a
//! single byte.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::SyncConfig;

/// Receive buffer size for the single read.
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Bounded wait for the peer's first bytes.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(2000);

/// Reply sent after a successful read.
pub const CANNED_RESPONSE: &[u8] = b"HTTP/1.0 200 OK\r\nContent-length: 11\r\n\r\nsync_server";

/// Counter for connection IDs. Only uniqueness matters.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// An accepted connection, owned by exactly one handler task.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    stream: TcpStream,
    peer_addr: SocketAddr,
}

impl Connection {
    /// Wrap an accepted stream and assign it a fresh ID.
    pub fn new(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            stream,
            peer_addr,
        }
    }

    /// Connection ID used in log fields.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Remote address reported by accept.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

/// How a single exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Read succeeded and the canned reply was written.
    Replied { bytes_read: usize },
    /// Nothing arrived within the read timeout; nothing was written.
    TimedOut,
    /// The read failed; nothing was written.
    ReadFailed,
    /// The read succeeded but writing the reply failed.
    WriteFailed,
}

/// Serves one request/response exchange per connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    config: Arc<SyncConfig>,
    read_timeout: Duration,
}

impl ConnectionHandler {
    /// Create a handler that waits at most `read_timeout` for the first read.
    pub fn new(config: Arc<SyncConfig>, read_timeout: Duration) -> Self {
        Self {
            config,
            read_timeout,
        }
    }

    /// Run the exchange to completion. Consumes and closes the connection.
    pub async fn handle(&self, conn: Connection) -> HandlerOutcome {
        let Connection {
            id,
            mut stream,
            peer_addr,
        } = conn;

        // Reconciliation will be keyed on the peer's place in the topology.
        let known_peer = self.config.knows_host(&peer_addr.ip().to_string());
        tracing::debug!(connection_id = %id, peer_addr = %peer_addr, known_peer, "Handling connection");

        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        let outcome = match tokio::time::timeout(self.read_timeout, stream.read(&mut buf)).await {
            Err(_) => {
                tracing::debug!(
                    connection_id = %id,
                    timeout = ?self.read_timeout,
                    "Read timed out"
                );
                HandlerOutcome::TimedOut
            }
            Ok(Err(e)) => {
                tracing::debug!(connection_id = %id, error = %e, "Read failed");
                HandlerOutcome::ReadFailed
            }
            Ok(Ok(bytes_read)) => match stream.write_all(CANNED_RESPONSE).await {
                Ok(()) => HandlerOutcome::Replied { bytes_read },
                Err(e) => {
                    tracing::debug!(connection_id = %id, error = %e, "Write failed");
                    HandlerOutcome::WriteFailed
                }
            },
        };

        if let Err(e) = stream.shutdown().await {
            tracing::trace!(connection_id = %id, error = %e, "Shutdown failed");
        }
        tracing::trace!(connection_id = %id, ?outcome, "Connection closed");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn pair() -> (TcpStream, Connection) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap())
            .await
            .unwrap();
        let (server, peer_addr) = listener.accept().await.unwrap();
        (client, Connection::new(server, peer_addr))
    }

    fn handler(read_timeout: Duration) -> ConnectionHandler {
        ConnectionHandler::new(Arc::new(SyncConfig::default()), read_timeout)
    }

    #[test]
    fn connection_id_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn canned_response_length_header_matches_body() {
        let text = std::str::from_utf8(CANNED_RESPONSE).unwrap();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        assert!(head.ends_with(&format!("Content-length: {}", body.len())));
        assert_eq!(body, "sync_server");
    }

    #[tokio::test]
    async fn replies_after_successful_read() {
        let (mut client, conn) = pair().await;
        client.write_all(b"GET / HTTP/1.0\r\n\r\n").await.unwrap();

        let outcome = handler(DEFAULT_READ_TIMEOUT).handle(conn).await;
        assert_eq!(outcome, HandlerOutcome::Replied { bytes_read: 18 });

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        assert_eq!(reply, CANNED_RESPONSE);
    }

    #[tokio::test]
    async fn timeout_closes_without_writing() {
        let (mut client, conn) = pair().await;

        let outcome = handler(Duration::from_millis(50)).handle(conn).await;
        assert_eq!(outcome, HandlerOutcome::TimedOut);

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn unbounded_read_timeout_still_replies() {
        let (mut client, conn) = pair().await;
        client.write_all(b"ping").await.unwrap();

        let outcome = handler(Duration::MAX).handle(conn).await;
        assert_eq!(outcome, HandlerOutcome::Replied { bytes_read: 4 });

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        assert_eq!(reply, CANNED_RESPONSE);
    }

    #[tokio::test]
    async fn half_closed_peer_still_gets_reply() {
        let (mut client, conn) = pair().await;
        client.shutdown().await.unwrap();

        let outcome = handler(DEFAULT_READ_TIMEOUT).handle(conn).await;
        assert_eq!(outcome, HandlerOutcome::Replied { bytes_read: 0 });

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        assert_eq!(reply, CANNED_RESPONSE);
    }
}
