//! Graceful shutdown handling.
//!
//! SSE responses never finish on their own, so the HTTP server could not
//! drain while a stream is open. On Ctrl+C or SIGTERM the signal is
//! broadcast, every open stream ends, and `axum::serve` can complete.

use tokio::signal;
use tokio::sync::broadcast;

/// Broadcast handle shared by the server and every SSE stream
#[derive(Clone)]
pub struct ShutdownSignal {
    tx: broadcast::Sender<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify all subscribers; returns how many were listening
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Resolve on Ctrl+C or SIGTERM, then notify all subscribers.
    pub async fn wait_for_os_signal(self) {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                tracing::info!("Received Ctrl+C, initiating graceful shutdown");
            }
            _ = terminate => {
                tracing::info!("Received terminate signal, initiating graceful shutdown");
            }
        }

        let streams = self.trigger();
        tracing::info!(streams, "Shutdown signal sent to open streams");
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let signal = ShutdownSignal::new();
        let mut a = signal.subscribe();
        let mut b = signal.clone().subscribe();

        assert_eq!(signal.trigger(), 2);
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[test]
    fn test_subscriber_pending_until_trigger() {
        let signal = ShutdownSignal::new();
        let mut rx = signal.subscribe();

        let mut recv = tokio_test::task::spawn(rx.recv());
        tokio_test::assert_pending!(recv.poll());

        signal.trigger();
        assert!(recv.is_woken());
        tokio_test::assert_ready_ok!(recv.poll());
    }

    #[test]
    fn test_trigger_without_subscribers() {
        assert_eq!(ShutdownSignal::new().trigger(), 0);
    }
}
