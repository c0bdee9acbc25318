//! Reactor-per-core server.
//!
//! # Data Flow
//! ```text
//! ServerSupervisor
//!     → SharedListener::bind(port)            (fatal on failure)
//!     → N × thread "sync-worker-<n>"
//!           → ConnectionScheduler (current-thread runtime + LocalSet)
//!                 → listener task: accept loop on the shared socket
//!                 → spawn_local(ConnectionHandler) per connection
//!     → join all workers, release the socket
//! ```
//!
//! # Design Decisions
//! - N defaults to the number of logical processors
//! - All workers race to accept on one socket; no dispatcher thread
//! - Handler tasks are fire-and-forget with no concurrency bound
//! - The config is shared read-only; nothing else crosses threads except
//!   the socket and the continuation flag

pub mod context;
pub mod scheduler;
pub mod supervisor;

pub use context::ServerContext;
pub use scheduler::{ConnectionScheduler, StopReason};
pub use supervisor::{ServerError, ServerSupervisor};
