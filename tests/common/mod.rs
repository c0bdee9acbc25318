//! Shared utilities for integration tests.

use std::net::{Ipv4Addr, SocketAddr};
use std::thread::JoinHandle;
use std::time::Duration;

use sync_agent::server::ServerError;
use sync_agent::{Shutdown, ServerContext, ServerSupervisor, SyncConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A running agent on an ephemeral port.
pub struct RunningAgent {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

/// Bind on port 0 and run the supervisor on a background thread.
pub fn start_agent(width: usize, read_timeout: Duration) -> RunningAgent {
    let ctx = ServerContext::new(SyncConfig::default())
        .with_width(width)
        .with_read_timeout(read_timeout);
    let supervisor = ServerSupervisor::bind(ctx).unwrap();

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, supervisor.local_addr().port()));
    let shutdown = supervisor.shutdown();
    let handle = std::thread::spawn(move || supervisor.run());

    RunningAgent {
        addr,
        shutdown,
        handle,
    }
}

/// Connect, optionally send `payload`, and collect everything until close.
pub async fn exchange(addr: SocketAddr, payload: Option<&[u8]>) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    if let Some(payload) = payload {
        stream.write_all(payload).await.unwrap();
    }

    let mut reply = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), stream.read_to_end(&mut reply))
        .await
        .expect("agent never closed the connection")
        .unwrap();
    reply
}
