//! Storage subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceConfig.storage
//!     → open() picks the driver
//!     → FileStore (file) | MemoryStore (memory)
//!     → Arc<dyn Storage> shared by every request handler
//! ```
//!
//! # Design Decisions
//! - Handlers only see the `Storage` trait, never a concrete store
//! - Initialisation is idempotent and happens once, in the constructor
//! - Each store serialises its own writes; callers never lock
//! - No retries here: a failed call is reported once to the handler

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

use std::sync::Arc;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::Storage;

use crate::config::{StorageConfig, StorageDriver};

/// Construct the store selected by `config`.
pub async fn open(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    let store: Arc<dyn Storage> = match config.driver {
        StorageDriver::File => Arc::new(FileStore::open(&config.path).await?),
        StorageDriver::Memory => Arc::new(MemoryStore::with_capacity(config.max_records)),
    };

    tracing::info!(driver = ?config.driver, "Storage initialised");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::{validate, NewStudent, StudentId};

    #[tokio::test]
    async fn opens_configured_driver() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            driver: StorageDriver::File,
            path: dir.path().join("db.jsonl").to_string_lossy().into_owned(),
            max_records: None,
        };

        let store = open(&config).await.unwrap();
        let student = validate(NewStudent {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            age: 30,
        })
        .unwrap();
        assert_eq!(store.create_student(&student).await.unwrap(), StudentId(1));
        assert!(dir.path().join("db.jsonl").exists());
    }
}
