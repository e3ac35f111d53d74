//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (grace period > 0, limits > 0)
//! - Check the listen address parses
//! - Check driver-specific storage settings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{ServiceConfig, StorageDriver};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("env must not be empty")]
    EmptyEnv,

    #[error("http_server.address {address:?} is not a socket address")]
    InvalidAddress { address: String },

    #[error("storage.path is required for the file driver")]
    MissingStoragePath,

    #[error("storage.max_records must be greater than zero")]
    ZeroCapacity,

    #[error("shutdown.grace_period_secs must be greater than zero")]
    ZeroGracePeriod,

    #[error("limits.{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}

/// Check every semantic rule and collect all failures.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.env.trim().is_empty() {
        errors.push(ValidationError::EmptyEnv);
    }

    if config.http_server.address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            address: config.http_server.address.clone(),
        });
    }

    if config.storage.driver == StorageDriver::File && config.storage.path.trim().is_empty() {
        errors.push(ValidationError::MissingStoragePath);
    }

    if config.storage.max_records == Some(0) {
        errors.push(ValidationError::ZeroCapacity);
    }

    if config.shutdown.grace_period_secs == 0 {
        errors.push(ValidationError::ZeroGracePeriod);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroLimit { field: "max_body_bytes" });
    }

    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroLimit { field: "request_timeout_secs" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
