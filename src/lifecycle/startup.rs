//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the configured store
//! - Build the HTTP server around it
//! - Install signal handlers
//! - Start the coordinator and hand control to it until the drain ends
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Signal handlers go in before the listener starts
//! - Listeners start last (traffic only when ready)

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::coordinator::{DrainOutcome, LifecycleCoordinator, LifecycleError};
use crate::lifecycle::signals;
use crate::storage::{self, StorageError};

/// Anything that stops the service from reaching `Serving`.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("storage initialisation failed: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Run the service described by `config` until it has been told to stop
/// and has drained.
pub async fn run(config: &ServiceConfig) -> Result<DrainOutcome, StartupError> {
    let storage = storage::open(&config.storage).await?;
    tracing::info!(env = %config.env, "Storage ready");

    let server = HttpServer::new(storage, config);
    let termination = signals::listen().map_err(StartupError::Signals)?;

    let serving = LifecycleCoordinator::new(config).start(server).await?;
    tracing::info!(
        address = %serving.local_addr(),
        env = %config.env,
        "Server started"
    );

    Ok(serving.run_until_terminated(termination).await?)
}
