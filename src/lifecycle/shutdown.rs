//! Shutdown coordination for the service.

use std::fmt;

use tokio::sync::broadcast;

/// Why the service is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// Requested in-process (tests, embedding).
    Requested,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownReason::Interrupt => "interrupt",
            ShutdownReason::Terminate => "terminate",
            ShutdownReason::Requested => "requested",
        })
    }
}

/// Coordinator for graceful shutdown.
///
/// The HTTP server and the route reload loop each hold a receiver; the first
/// reason sent stops both.
pub struct Shutdown {
    tx: broadcast::Sender<ShutdownReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.tx.subscribe()
    }

    /// Stop with [`ShutdownReason::Requested`].
    pub fn trigger(&self) {
        self.trigger_with(ShutdownReason::Requested);
    }

    pub fn trigger_with(&self, reason: ShutdownReason) {
        // No receivers means nothing is running yet.
        let _ = self.tx.send(reason);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
