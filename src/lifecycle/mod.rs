//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Initialize logging → Bind shared socket → Start workers
//!
//! Shutdown (shutdown.rs):
//!     Flag triggered → each accept loop exits at its next iteration
//!     → worker drains its live handlers → supervisor joins
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and nothing is served
//! - Shutdown is cooperative; a blocked accept is never interrupted

pub mod shutdown;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
