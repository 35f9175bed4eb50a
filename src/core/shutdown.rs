//! # Cross-platform OS signal handling.
//!
//! Provides [`wait_for_shutdown_signal`], which completes when the process
//! receives a termination signal. [`Scheduler::run`](crate::Scheduler::run)
//! races it against its cancellation token.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd)
//! - `SIGQUIT` (hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when Ctrl-C is received, or `Err` if registration fails.
#[cfg(not(unix))]
pub(crate) async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
