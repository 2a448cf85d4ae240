//! Shutdown signal handling.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Turns SIGINT/SIGTERM (Ctrl+C elsewhere) into cancellation of the loop.
#[derive(Clone, Default)]
pub(crate) struct SignalHandler {
    token: CancellationToken,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled once shutdown is requested.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn request_shutdown(&self) {
        if self.token.is_cancelled() {
            warn!("Shutdown already in progress");
        }
        self.token.cancel();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Install OS signal handlers (Unix).
    #[cfg(unix)]
    pub fn setup_os_signals(&self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let handler = self.clone();
        tokio::spawn(async move {
            while sigterm.recv().await.is_some() {
                info!("Received SIGTERM");
                handler.request_shutdown();
            }
        });

        let mut sigint = signal(SignalKind::interrupt())?;
        let handler = self.clone();
        tokio::spawn(async move {
            while sigint.recv().await.is_some() {
                info!("Received SIGINT");
                handler.request_shutdown();
            }
        });

        Ok(())
    }

    /// Install OS signal handlers (non-Unix fallback).
    #[cfg(not(unix))]
    pub fn setup_os_signals(&self) -> std::io::Result<()> {
        let handler = self.clone();

        // Only Ctrl+C is available on non-Unix
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Received Ctrl+C");
                handler.request_shutdown();
            }
        });

        Ok(())
    }
}
