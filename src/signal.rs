//! Signal handling for graceful shutdown.
//!
//! SIGINT and SIGTERM cancel the shared [`CancellationToken`], which makes
//! in-flight list downloads and the DNS check fail fast.

use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Spawn a task that cancels `token` on the first SIGINT or SIGTERM.
///
/// If signal handlers cannot be registered (e.g., in restricted environments),
/// the task logs a warning and exits without touching the token. The task also
/// exits once the token is cancelled by someone else.
pub fn spawn_shutdown_listener(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to register SIGINT handler: {}", e);
                return;
            }
        };
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {}", e);
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT, cancelling pending work...");
                token.cancel();
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, cancelling pending work...");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}
