//! Termination signal handling.
//!
//! Signals never interrupt the bridge loop directly. A listener task flips a
//! watch flag and the loop checks it at the top of every iteration.

use tokio::sync::watch;

/// Spawn a task that sets the returned flag on SIGINT or SIGTERM.
pub fn spawn_signal_listener() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        tracing::info!(signal, "Received shutdown signal");
        let _ = tx.send(true);
    });

    rx
}

/// Whether shutdown has been requested on this flag.
pub fn shutdown_requested(flag: &watch::Receiver<bool>) -> bool {
    *flag.borrow()
}

async fn wait_for_signal() -> &'static str {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate() => "SIGTERM",
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
