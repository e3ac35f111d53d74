//! Student service library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod storage;
pub mod students;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{DrainOutcome, LifecycleCoordinator, Shutdown};
pub use storage::Storage;
