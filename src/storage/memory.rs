//! In-memory storage backend.

use std::collections::BTreeMap;

use tokio::sync::Mutex;
use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::Storage;
use crate::students::{Student, StudentId, ValidStudent};

/// In-memory store backed by a `Mutex<BTreeMap>`.
///
/// Useful for testing and for the `memory` driver. An optional record limit
/// makes the store report [`StorageError::Exhausted`] once full.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    max_records: Option<usize>,
}

struct Inner {
    next_id: i64,
    students: BTreeMap<StudentId, Student>,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Create a store that holds at most `max_records` students.
    pub fn with_capacity(max_records: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                students: BTreeMap::new(),
            }),
            max_records,
        }
    }

    /// Number of stored students.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.students.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStore {
    async fn create_student(&self, student: &ValidStudent) -> StorageResult<StudentId> {
        let mut inner = self.inner.lock().await;

        if let Some(max) = self.max_records {
            if inner.students.len() >= max {
                return Err(StorageError::Exhausted(format!(
                    "memory store holds its maximum of {max} records"
                )));
            }
        }

        let id = StudentId(inner.next_id);
        inner.next_id += 1;
        inner.students.insert(id, student.clone().into_student(id));

        debug!(student_id = %id, "stored student in memory");
        Ok(id)
    }

    async fn get_student(&self, id: StudentId) -> StorageResult<Option<Student>> {
        let inner = self.inner.lock().await;
        Ok(inner.students.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::{validate, NewStudent};
    use std::sync::Arc;

    fn ann() -> ValidStudent {
        validate(NewStudent {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            age: 30,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn ids_increase_and_records_are_readable() {
        let store = MemoryStore::new();

        let first = store.create_student(&ann()).await.unwrap();
        let second = store.create_student(&ann()).await.unwrap();
        assert_eq!(first, StudentId(1));
        assert_eq!(second, StudentId(2));

        let stored = store.get_student(first).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ann");
        assert_eq!(stored.age, 30);
        assert!(store.get_student(StudentId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn full_store_is_exhausted() {
        let store = MemoryStore::with_capacity(Some(1));
        store.create_student(&ann()).await.unwrap();

        let err = store.create_student(&ann()).await.unwrap_err();
        assert!(matches!(err, StorageError::Exhausted(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.create_student(&ann()).await }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
        assert_eq!(store.len().await, 32);
    }
}
