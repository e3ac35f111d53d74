//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), located by --config / CONFIG_PATH
//!     → loader.rs (read, parse & deserialize, ENV override)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → passed by reference to storage and lifecycle constructors
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Identity fields (env, address, storage) have no defaults
//! - Validation separates syntactic (serde) from semantic checks
//! - Any loading failure is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    HttpServerConfig, LimitsConfig, LogFormat, ObservabilityConfig, ServiceConfig,
    ShutdownConfig, StorageConfig, StorageDriver,
};
