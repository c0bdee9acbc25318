//! File-synchronization agent library.
//!
//! Loads the sync topology (watched directories, host subscriptions, peer
//! servers) and runs a reactor-per-core TCP listener that peers connect to.

pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod server;

pub use config::schema::SyncConfig;
pub use lifecycle::Shutdown;
pub use server::{ServerContext, ServerSupervisor};
