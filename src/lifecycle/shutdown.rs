//! Shutdown coordination for the agent.

use std::sync::Arc;

use tokio::sync::watch;

/// Process-wide continuation flag.
///
/// Cloned into every worker thread. Triggering it is advisory: accept loops
/// observe it only at the top of each iteration, so a blocked accept keeps
/// waiting until its next connection arrives.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a new, untriggered shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to the shutdown flag.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Never reset.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Check whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of [`Shutdown`], polled by accept loops.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Check whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_is_seen_by_existing_and_new_subscribers() {
        let shutdown = Shutdown::new();
        let early = shutdown.subscribe();
        assert!(!early.is_triggered());

        shutdown.trigger();
        assert!(early.is_triggered());
        assert!(shutdown.subscribe().is_triggered());
        assert!(shutdown.clone().is_triggered());
    }
}
