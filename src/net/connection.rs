//! In-flight request tracking.
//!
//! # Responsibilities
//! - Count requests currently being handled
//! - Report how many requests a forced stop abandons

use std::sync::Arc;
use tokio::sync::watch;

/// Tracks in-flight requests for graceful shutdown.
///
/// The count lives in a watch channel so the lifecycle can observe it.
#[derive(Debug, Clone)]
pub struct InFlightTracker {
    count: Arc<watch::Sender<u64>>,
}

impl InFlightTracker {
    /// Create a new tracker with nothing in flight.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self {
            count: Arc::new(tx),
        }
    }

    /// Record a new in-flight request. Returns a guard that decrements on drop.
    pub fn track(&self) -> RequestGuard {
        self.count.send_modify(|n| *n += 1);
        RequestGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Get current in-flight count.
    pub fn in_flight(&self) -> u64 {
        *self.count.borrow()
    }
}

impl Default for InFlightTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that tracks a request's lifetime.
/// Decrements the in-flight count when dropped, including on panic or abort.
#[derive(Debug)]
pub struct RequestGuard {
    count: Arc<watch::Sender<u64>>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }
}
