//! Per-thread connection scheduler.
//!
//! # States
//! ```text
//! Idle → Running (listener task accepting)
//!          ├─ accept ok   → spawn detached handler task → Running
//!          ├─ accept err  → Stopped
//!          └─ flag set    → Stopped (checked at loop top only)
//! ```
//!
//! Each scheduler is a current-thread runtime driving a `LocalSet`. Exactly
//! one listener task blocks on accept; every accepted connection gets its
//! own `spawn_local` task that the listener never waits on. After the
//! listener stops, the scheduler keeps running until its live handler
//! tasks have finished.

use std::io;

use tokio::net::TcpListener;
use tokio::task::LocalSet;

use crate::lifecycle::ShutdownSignal;
use crate::net::{Connection, ConnectionHandler};
use crate::server::context::ServerContext;

/// Why a listener task left its accept loop.
#[derive(Debug)]
pub enum StopReason {
    /// The continuation flag was observed at the top of the loop.
    Shutdown,
    /// `accept` returned an error.
    AcceptFailed(io::Error),
}

/// One cooperative scheduler bound to a duplicate of the shared socket.
pub struct ConnectionScheduler {
    worker: usize,
    listener: std::net::TcpListener,
    shutdown: ShutdownSignal,
    handler: ConnectionHandler,
}

impl ConnectionScheduler {
    /// Build the scheduler for worker `worker` around its duplicate of the socket.
    pub fn new(worker: usize, listener: std::net::TcpListener, ctx: &ServerContext) -> Self {
        Self {
            worker,
            listener,
            shutdown: ctx.shutdown().subscribe(),
            handler: ConnectionHandler::new(ctx.config().clone(), ctx.read_timeout()),
        }
    }

    /// Run on the calling thread until the listener task stops and every
    /// handler task it spawned has finished.
    pub fn run(self) -> io::Result<StopReason> {
        let Self {
            worker,
            listener,
            shutdown,
            handler,
        } = self;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let listener = {
            let _guard = runtime.enter();
            TcpListener::from_std(listener)?
        };

        let local = LocalSet::new();
        let listen_task = local.spawn_local(listen(worker, listener, shutdown, handler));
        runtime.block_on(local);

        runtime.block_on(listen_task).map_err(io::Error::other)
    }
}

async fn listen(
    worker: usize,
    listener: TcpListener,
    shutdown: ShutdownSignal,
    handler: ConnectionHandler,
) -> StopReason {
    tracing::debug!(worker, "Listener task running");

    while !shutdown.is_triggered() {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!(worker, error = %e, "sync_server accept failed");
                return StopReason::AcceptFailed(e);
            }
        };

        let conn = Connection::new(stream, peer_addr);
        tracing::trace!(worker, connection_id = %conn.id(), peer_addr = %peer_addr, "Connection accepted");

        let handler = handler.clone();
        tokio::task::spawn_local(async move {
            handler.handle(conn).await;
        });
    }

    tracing::debug!(worker, "Shutdown observed, listener task stopping");
    StopReason::Shutdown
}
