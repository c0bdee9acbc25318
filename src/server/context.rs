//! Explicit server context handed to the supervisor and every scheduler.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::lifecycle::Shutdown;
use crate::net::connection::DEFAULT_READ_TIMEOUT;

/// Everything the workers share: immutable config, continuation flag,
/// concurrency width and handler timing.
#[derive(Debug, Clone)]
pub struct ServerContext {
    config: Arc<SyncConfig>,
    shutdown: Shutdown,
    width: usize,
    read_timeout: Duration,
}

impl ServerContext {
    /// Wrap `config` with a fresh shutdown flag, the detected width and the
    /// default read timeout.
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: Shutdown::new(),
            width: detect_width(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the number of worker threads. Clamped to at least 1.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    /// Override how long a handler waits for the peer's first bytes.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Shared, read-only configuration.
    pub fn config(&self) -> &Arc<SyncConfig> {
        &self.config
    }

    /// Continuation flag shared by every worker.
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Number of worker threads to start.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Bounded wait for a peer's first bytes.
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

/// Logical processors available to the process, or 1 if unknown.
pub fn detect_width() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_is_at_least_one() {
        assert!(detect_width() >= 1);
        let ctx = ServerContext::new(SyncConfig::default()).with_width(0);
        assert_eq!(ctx.width(), 1);
    }

    #[test]
    fn clones_share_the_shutdown_flag() {
        let ctx = ServerContext::new(SyncConfig::default());
        let clone = ctx.clone();
        ctx.shutdown().trigger();
        assert!(clone.shutdown().is_triggered());
    }
}
