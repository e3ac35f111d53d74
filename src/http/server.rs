//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, request ID, in-flight tracking)
//! - Accept connections and serve each on its own task
//! - Stop accepting when the shutdown broadcast fires, then let
//!   in-flight requests finish
//!
//! # Design Decisions
//! - Connection tasks live in a `JoinSet` owned by the serve future, so
//!   aborting the server task aborts every connection with it

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use hyper::server::conn::http1;
use hyper_util::{rt::TokioIo, service::TowerToHyperService};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinSet;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::net::InFlightTracker;
use crate::storage::Storage;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

/// HTTP server for the student service.
pub struct HttpServer {
    router: Router,
    tracker: InFlightTracker,
}

impl HttpServer {
    /// Create a new HTTP server backed by `storage`.
    pub fn new(storage: Arc<dyn Storage>, config: &ServiceConfig) -> Self {
        let tracker = InFlightTracker::new();
        let state = AppState { storage };
        let router = Self::build_router(config, state, tracker.clone());
        Self { router, tracker }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState, tracker: InFlightTracker) -> Router {
        Router::new()
            .route("/api/students", post(handlers::create_student))
            .route("/api/students/{id}", get(handlers::get_student))
            .route("/api/ready", get(handlers::ready))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(middleware::from_fn_with_state(tracker, track_in_flight))
            .layer(TimeoutLayer::new(Duration::from_secs(config.limits.request_timeout_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle on the in-flight request count.
    pub fn tracker(&self) -> InFlightTracker {
        self.tracker.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires and every accepted connection has finished.
    ///
    /// Dropping the returned future aborts all open connections.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let (stopping, _) = watch::channel(false);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        connections.spawn(serve_connection(
                            stream,
                            peer,
                            self.router.clone(),
                            stopping.subscribe(),
                        ));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    log_connection_exit(finished);
                }
            }
        }

        drop(listener);
        tracing::info!(
            open_connections = connections.len(),
            "HTTP server no longer accepting connections"
        );
        stopping.send_replace(true);

        while let Some(finished) = connections.join_next().await {
            log_connection_exit(finished);
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Serve HTTP/1 on one connection, closing it gracefully once `stopping` flips.
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Router,
    mut stopping: watch::Receiver<bool>,
) {
    let service = TowerToHyperService::new(router);
    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    let mut draining = false;
    let result = loop {
        tokio::select! {
            result = conn.as_mut() => break result,
            changed = stopping.changed(), if !draining => {
                draining = true;
                if changed.is_ok() {
                    conn.as_mut().graceful_shutdown();
                }
            }
        }
    };

    if let Err(e) = result {
        tracing::debug!(peer = %peer, error = %e, "Connection closed with error");
    }
}

fn log_connection_exit(finished: Result<(), tokio::task::JoinError>) {
    if let Err(e) = finished {
        if e.is_panic() {
            tracing::error!(error = %e, "Connection task panicked");
        }
    }
}

/// Hold an in-flight guard for the lifetime of each request.
async fn track_in_flight(
    State(tracker): State<InFlightTracker>,
    request: Request,
    next: Next,
) -> Response {
    let guard = tracker.track();
    let response = next.run(request).await;
    drop(guard);
    response
}
