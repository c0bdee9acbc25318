//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems emit tracing events with structured fields
//! (worker, connection_id, peer_addr, port)
//!     → logging.rs subscriber
//!     → console | log file | syslog-friendly stderr
//! ```

pub mod logging;
