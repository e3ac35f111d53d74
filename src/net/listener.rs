//! TCP listener binding.
//!
//! # Responsibilities
//! - Parse and bind the configured address
//! - Report bind failures as a distinct, fatal error
//! - Expose the bound address (port 0 resolves here)

use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// The configured address is not a socket address.
    InvalidAddress(String),
    /// Failed to bind to address.
    Bind(SocketAddr, std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::InvalidAddress(addr) => write!(f, "Invalid listen address: {}", addr),
            ListenerError::Bind(addr, e) => write!(f, "Failed to bind {}: {}", addr, e),
        }
    }
}

impl std::error::Error for ListenerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ListenerError::Bind(_, e) => Some(e),
            ListenerError::InvalidAddress(_) => None,
        }
    }
}

/// A bound TCP listener ready to be handed to the HTTP server.
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to `address`. There is no retry: a failed bind is a configuration error.
    pub async fn bind(address: &str) -> Result<Self, ListenerError> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| ListenerError::InvalidAddress(address.to_string()))?;

        let inner = TcpListener::bind(addr)
            .await
            .map_err(|e| ListenerError::Bind(addr, e))?;

        let local_addr = inner.local_addr().map_err(|e| ListenerError::Bind(addr, e))?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Release the underlying Tokio listener.
    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}
