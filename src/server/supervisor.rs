//! Server supervisor: one shared socket, one scheduler thread per core.

use std::io;
use std::net::SocketAddr;
use std::thread;

use thiserror::Error;

use crate::lifecycle::Shutdown;
use crate::net::{ListenerError, SharedListener};
use crate::server::context::ServerContext;
use crate::server::scheduler::{ConnectionScheduler, StopReason};

/// Error type for server startup.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("failed to start worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: io::Error,
    },
}

/// Owns the listening socket and the worker threads.
pub struct ServerSupervisor {
    ctx: ServerContext,
    listener: SharedListener,
}

impl ServerSupervisor {
    /// Open the shared socket on the configured port. Nothing is served yet.
    pub fn bind(ctx: ServerContext) -> Result<Self, ServerError> {
        let port = ctx.config().port;
        let listener = SharedListener::bind(port).inspect_err(|e| {
            tracing::error!(port, error = %e, "Failed to open listening socket");
        })?;

        tracing::info!(
            address = %listener.local_addr(),
            workers = ctx.width(),
            "sync_server started"
        );

        Ok(Self { ctx, listener })
    }

    /// Address the shared socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Handle to the continuation flag shared with every worker.
    pub fn shutdown(&self) -> Shutdown {
        self.ctx.shutdown().clone()
    }

    /// Start `width` worker threads and block until all of them exit.
    pub fn run(self) -> Result<(), ServerError> {
        let width = self.ctx.width();
        let mut workers = Vec::with_capacity(width);

        for worker in 0..width {
            let started = self
                .listener
                .try_clone_std()
                .map_err(|e| ServerError::Listener(ListenerError::Socket(e)))
                .and_then(|listener| {
                    let scheduler = ConnectionScheduler::new(worker, listener, &self.ctx);
                    thread::Builder::new()
                        .name(format!("sync-worker-{worker}"))
                        .spawn(move || scheduler.run())
                        .map_err(|source| ServerError::Spawn { worker, source })
                });

            match started {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    tracing::error!(worker, error = %e, "Worker startup failed, shutting down");
                    self.ctx.shutdown().trigger();
                    return Err(e);
                }
            }
        }

        for (worker, handle) in workers.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(StopReason::Shutdown)) => tracing::info!(worker, "Worker stopped"),
                Ok(Ok(StopReason::AcceptFailed(e))) => {
                    tracing::warn!(worker, error = %e, "Worker stopped after accept failure")
                }
                Ok(Err(e)) => tracing::error!(worker, error = %e, "Worker failed"),
                Err(_) => tracing::error!(worker, "Worker panicked"),
            }
        }

        tracing::info!(address = %self.listener.local_addr(), "sync_server stopped");
        Ok(())
    }
}
