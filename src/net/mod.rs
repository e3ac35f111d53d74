//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig.http_server.address
//!     → listener.rs (parse, bind; failure is fatal)
//!     → Hand off to HTTP layer (axum serve loop)
//!     → connection.rs (per-request in-flight guard)
//!
//! Request States:
//!     In flight → Finished | Abandoned (forced stop)
//! ```
//!
//! # Design Decisions
//! - No bind retry: a failed bind is a configuration error
//! - Each request tracked for graceful shutdown reporting

pub mod connection;
pub mod listener;

pub use connection::{InFlightTracker, RequestGuard};
pub use listener::{Listener, ListenerError};
