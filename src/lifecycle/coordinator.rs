//! Lifecycle state machine.
//!
//! ```text
//! Starting ──bind ok──▶ Serving ──termination──▶ Draining ──▶ Stopped
//!     │                                             │
//!     └──bind failed──▶ Stopped (fatal)             ├─ server done  → Completed
//!                                                   └─ grace elapsed → Forced
//! ```
//!
//! [`LifecycleCoordinator::start`] consumes the coordinator and
//! [`Serving::run_until_terminated`] consumes the serving handle, so a process
//! walks the machine exactly once.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::Termination;
use crate::net::{InFlightTracker, Listener, ListenerError};

/// Where the process is in its single start/stop traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Serving,
    Draining,
    Stopped,
}

/// How the drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every in-flight request finished before the deadline.
    Completed,
    /// The deadline elapsed; `abandoned` requests were still running.
    Forced { abandoned: u64 },
}

/// Errors that end the lifecycle early.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The listener could not be bound. Fatal, never retried.
    #[error("failed to start listener: {0}")]
    Bind(#[from] ListenerError),

    /// The serve loop ended while still serving.
    #[error("HTTP server exited while serving: {0}")]
    ServerExited(String),
}

/// Drives one `Starting → Serving → Draining → Stopped` traversal.
pub struct LifecycleCoordinator {
    address: String,
    grace: Duration,
    state: watch::Sender<LifecycleState>,
}

impl LifecycleCoordinator {
    /// Create a coordinator for the configured address and grace period.
    pub fn new(config: &ServiceConfig) -> Self {
        let (state, _) = watch::channel(LifecycleState::Starting);
        Self {
            address: config.http_server.address.clone(),
            grace: Duration::from_secs(config.shutdown.grace_period_secs),
            state,
        }
    }

    /// Override the drain deadline.
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Bind the listener and start serving on a dedicated task.
    pub async fn start(self, server: HttpServer) -> Result<Serving, LifecycleError> {
        let listener = match Listener::bind(&self.address).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(address = %self.address, error = %e, "Listener bind failed");
                transition(&self.state, LifecycleState::Stopped);
                return Err(e.into());
            }
        };

        let local_addr = listener.local_addr();
        let shutdown = Shutdown::new();
        let tracker = server.tracker();
        let stop = shutdown.subscribe();
        let task = tokio::spawn(server.run(listener.into_inner(), stop));

        transition(&self.state, LifecycleState::Serving);

        Ok(Serving {
            local_addr,
            grace: self.grace,
            state: self.state,
            shutdown,
            tracker,
            server: task,
        })
    }
}

/// A running server waiting for its termination signal.
pub struct Serving {
    local_addr: SocketAddr,
    grace: Duration,
    state: watch::Sender<LifecycleState>,
    shutdown: Shutdown,
    tracker: InFlightTracker,
    server: JoinHandle<std::io::Result<()>>,
}

enum Wake {
    Terminated(Termination),
    ServerExited(Result<std::io::Result<()>, JoinError>),
}

impl Serving {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Requests currently being handled.
    pub fn in_flight(&self) -> u64 {
        self.tracker.in_flight()
    }

    /// Serve until a termination arrives, then drain within the grace period.
    ///
    /// A forced stop is reported in the outcome and the logs, not as an error.
    pub async fn run_until_terminated(
        mut self,
        mut termination: mpsc::Receiver<Termination>,
    ) -> Result<DrainOutcome, LifecycleError> {
        let wake = tokio::select! {
            received = wait_for_termination(&mut termination) => Wake::Terminated(received),
            exited = &mut self.server => Wake::ServerExited(exited),
        };

        let received = match wake {
            Wake::Terminated(received) => received,
            Wake::ServerExited(exited) => {
                let reason = match exited {
                    Ok(Ok(())) => "serve loop returned".to_string(),
                    Ok(Err(e)) => e.to_string(),
                    Err(e) => e.to_string(),
                };
                tracing::error!(error = %reason, "HTTP server exited unexpectedly");
                transition(&self.state, LifecycleState::Stopped);
                return Err(LifecycleError::ServerExited(reason));
            }
        };

        tracing::info!(
            signal = ?received,
            in_flight = self.tracker.in_flight(),
            grace_ms = self.grace.as_millis() as u64,
            "Shutting down the server"
        );
        transition(&self.state, LifecycleState::Draining);
        self.shutdown.trigger();

        let outcome = match tokio::time::timeout(self.grace, &mut self.server).await {
            Ok(finished) => {
                match finished {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::error!(error = %e, "HTTP server failed while draining"),
                    Err(e) => tracing::error!(error = %e, "HTTP server task failed while draining"),
                }
                DrainOutcome::Completed
            }
            Err(_) => {
                let abandoned = self.tracker.in_flight();
                // Dropping the serve future drops every connection task with it.
                self.server.abort();
                let _ = (&mut self.server).await;
                tracing::error!(
                    abandoned,
                    grace_ms = self.grace.as_millis() as u64,
                    "Failed to shut down server within grace period, abandoning in-flight requests"
                );
                DrainOutcome::Forced { abandoned }
            }
        };

        transition(&self.state, LifecycleState::Stopped);
        tracing::info!(outcome = ?outcome, "Server shut down");
        Ok(outcome)
    }
}

/// Wait for the one termination. A closed channel never terminates.
async fn wait_for_termination(rx: &mut mpsc::Receiver<Termination>) -> Termination {
    match rx.recv().await {
        Some(received) => received,
        None => {
            tracing::warn!("Termination channel closed, serving until the process is killed");
            std::future::pending().await
        }
    }
}

fn transition(state: &watch::Sender<LifecycleState>, next: LifecycleState) {
    let previous = state.send_replace(next);
    tracing::debug!(from = ?previous, to = ?next, "Lifecycle transition");
}
