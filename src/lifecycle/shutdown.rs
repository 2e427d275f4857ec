//! Ctrl+C handling for graceful shutdown

use tracing::{debug, warn};

/// Waits for the console interrupt (Ctrl+C / Ctrl+Break)
pub struct ShutdownSignal;

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    pub async fn wait(&self) {
        match tokio::signal::ctrl_c().await {
            Ok(()) => debug!("received Ctrl+C"),
            Err(e) => warn!(?e, "failed to listen for Ctrl+C"),
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
