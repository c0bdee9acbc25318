//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! property file (key = value lines)
//!     → property.rs (line reader)
//!     → loader.rs (per-key dispatch, fail-closed)
//!     → topology.rs (watch set, subscribe map, server list)
//!     → SyncConfig (immutable)
//!     → shared via Arc with every worker thread
//! ```
//!
//! # Design Decisions
//! - Config is built once at startup and never mutated afterwards
//! - Any bad key or value fails the whole load; no partial config escapes
//! - Topology is rebuilt from the file on every start

pub mod dump;
pub mod loader;
pub mod property;
pub mod schema;
pub mod topology;

pub use loader::{load_config, ConfigError};
pub use schema::{LogDestination, LogLevel, SyncConfig};
pub use topology::{build_subscribe_map, build_watch_set, SubscribeMap, WatchSet};
