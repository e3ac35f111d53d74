//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT and SIGTERM (Ctrl-C elsewhere)
//! - Translate the first signal into a [`Termination`] on a single-slot channel
//!
//! # Design Decisions
//! - Handlers are registered before the listener starts, so an early signal
//!   is not lost
//! - Only one termination is ever delivered; later signals are logged and
//!   dropped while the drain runs

use tokio::sync::mpsc;

/// Why the process was asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
}

/// The single-slot channel a coordinator waits on.
pub fn termination_channel() -> (mpsc::Sender<Termination>, mpsc::Receiver<Termination>) {
    mpsc::channel(1)
}

/// Install signal handlers and return the receiving end of the termination channel.
#[cfg(unix)]
pub fn listen() -> std::io::Result<mpsc::Receiver<Termination>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let (tx, rx) = termination_channel();

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = sigint.recv() => Termination::Interrupt,
                Some(()) = sigterm.recv() => Termination::Terminate,
                else => break,
            };
            forward(&tx, received);
        }
    });

    Ok(rx)
}

/// Install signal handlers and return the receiving end of the termination channel.
#[cfg(not(unix))]
pub fn listen() -> std::io::Result<mpsc::Receiver<Termination>> {
    let (tx, rx) = termination_channel();

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            forward(&tx, Termination::Interrupt);
        }
    });

    Ok(rx)
}

fn forward(tx: &mpsc::Sender<Termination>, received: Termination) {
    match tx.try_send(received) {
        Ok(()) => tracing::info!(signal = ?received, "Termination signal received"),
        Err(_) => tracing::warn!(signal = ?received, "Shutdown already in progress, signal ignored"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_holds_a_single_termination() {
        let (tx, mut rx) = termination_channel();
        forward(&tx, Termination::Terminate);
        forward(&tx, Termination::Interrupt);

        assert_eq!(rx.recv().await, Some(Termination::Terminate));
        assert!(rx.try_recv().is_err());
    }
}
