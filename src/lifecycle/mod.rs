//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Open storage → Build server → Install signals → coordinator.start()
//!
//! Coordinator (coordinator.rs):
//!     Starting → Serving → Draining → Stopped
//!
//! Shutdown (shutdown.rs):
//!     Termination received → Stop accepting → Drain in-flight → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → single-slot termination channel
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then storage, then listener
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: forced stop after deadline, reported not raised

pub mod coordinator;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use coordinator::{DrainOutcome, LifecycleCoordinator, LifecycleError, LifecycleState, Serving};
pub use shutdown::Shutdown;
pub use signals::{termination_channel, Termination};
pub use startup::StartupError;
