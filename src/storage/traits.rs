//! The storage port.

use crate::storage::error::StorageResult;
use crate::students::{Student, StudentId, ValidStudent};

/// Capability for persisting students.
///
/// All implementations must be `Send + Sync` and safe to call concurrently
/// without external locking; each store owns its own synchronisation.
/// Schema/file initialisation happens in the constructor, never per call.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Persist a validated student and return its newly assigned id.
    ///
    /// On `Ok` the record is durable and visible to [`get_student`](Self::get_student).
    /// Ids are strictly increasing and never reused.
    async fn create_student(&self, student: &ValidStudent) -> StorageResult<StudentId>;

    /// Fetch a student by id. Returns `None` if no such record exists.
    async fn get_student(&self, id: StudentId) -> StorageResult<Option<Student>>;
}
