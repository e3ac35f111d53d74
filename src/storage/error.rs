//! Error types for storage operations.

/// Errors that can occur during storage operations.
///
/// Every variant is server-attributable; none of them carry client input.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The store could not be reached or an I/O operation on it failed.
    #[error("storage unavailable: {0}")]
    Unavailable(#[source] std::io::Error),

    /// The store rejected the record.
    #[error("storage constraint violated: {0}")]
    Constraint(String),

    /// The store is full or locked.
    #[error("storage exhausted: {0}")]
    Exhausted(String),

    /// Persisted data could not be read back.
    #[error("corrupt record at line {line}: {source}")]
    Corrupt {
        /// 1-based line in the store file.
        line: usize,
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Short label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "unavailable",
            StorageError::Constraint(_) => "constraint",
            StorageError::Exhausted(_) => "exhausted",
            StorageError::Corrupt { .. } => "corrupt",
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::StorageFull
            | std::io::ErrorKind::OutOfMemory
            | std::io::ErrorKind::WouldBlock => StorageError::Exhausted(err.to_string()),
            _ => StorageError::Unavailable(err),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
