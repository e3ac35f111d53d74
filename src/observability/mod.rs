//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (request_id, student_id, ...)
//!     → logging.rs subscriber (pretty or JSON to stdout)
//!
//! HTTP requests:
//!     → tower-http TraceLayer spans
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through handler logs

pub mod logging;
