//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! SharedListener (one socket, bound once)
//!     → duplicated into every worker (listener.rs)
//!     → accepted TcpStream wrapped in a Connection (connection.rs)
//!     → ConnectionHandler: bounded read → canned reply → close
//! ```
//!
//! # Design Decisions
//! - One listening socket shared by all workers; the kernel picks the winner
//! - A connection is owned by exactly one handler task for its whole life
//! - No keep-alive: one exchange per connection

pub mod connection;
pub mod listener;

pub use connection::{Connection, ConnectionHandler, ConnectionId, HandlerOutcome};
pub use listener::{ListenerError, SharedListener};
