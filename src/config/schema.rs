//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the student service.
///
/// `env`, `http_server.address` and `storage` have no defaults: a config file
/// that omits them is rejected at load time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Environment tag (e.g. "local", "staging", "prod").
    pub env: String,

    /// HTTP listener settings.
    pub http_server: HttpServerConfig,

    /// Storage driver selection and location.
    pub storage: StorageConfig,

    /// Graceful shutdown settings.
    #[serde(default)]
    pub shutdown: ShutdownConfig,

    /// Request size and time limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Logging settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// Bind address (e.g., "127.0.0.1:8082").
    pub address: String,
}

/// Which concrete store backs the storage port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageDriver {
    /// Embedded append-only JSON-lines file.
    #[default]
    File,
    /// Process-local map; contents are lost on exit.
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Backing store driver.
    #[serde(default)]
    pub driver: StorageDriver,

    /// Location of the store file. Required by the `file` driver.
    #[serde(default)]
    pub path: String,

    /// Maximum number of records held by the `memory` driver.
    #[serde(default)]
    pub max_records: Option<usize>,
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long in-flight requests may run after a stop signal, in seconds.
    pub grace_period_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_secs: 5,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl ServiceConfig {
    /// Minimal in-memory configuration bound to `address`.
    ///
    /// Used by tests and embedders that do not read a config file.
    pub fn in_memory(address: impl Into<String>) -> Self {
        Self {
            env: "test".to_string(),
            http_server: HttpServerConfig {
                address: address.into(),
            },
            storage: StorageConfig {
                driver: StorageDriver::Memory,
                path: String::new(),
                max_records: None,
            },
            shutdown: ShutdownConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
