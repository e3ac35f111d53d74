//! File-based storage backend.
//!
//! Stores one JSON object per line in a single append-only file:
//!
//! ```text
//! {"id":1,"name":"Ann","email":"ann@x.com","age":30}
//! {"id":2,"name":"Bob","email":"bob@x.com","age":41}
//! ```
//!
//! The file is the table: it is created (with its parent directories) on
//! open if absent, and the existing lines are replayed into an index so the
//! id sequence continues where it left off.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::Storage;
use crate::students::{Student, StudentId, ValidStudent};

/// Append-only JSON-lines store.
///
/// Writes are serialised by an internal lock, appended, and `sync_data`'d
/// before the call returns. A write that fails midway is truncated back off
/// the file so the next open does not see a torn line. If the truncate fails
/// too, the store refuses further writes.
///
/// Each append runs on its own task holding the lock, so a caller that is
/// dropped mid-write cannot leave the id sequence behind the file.
pub struct FileStore {
    path: PathBuf,
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    path: PathBuf,
    file: File,
    len: u64,
    next_id: i64,
    index: BTreeMap<StudentId, Student>,
    failed: bool,
}

impl FileStore {
    /// Open (creating if necessary) the store at `path`.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)
            .await?;

        let content = tokio::fs::read_to_string(&path).await?;
        let index = replay(&content)?;
        let next_id = index.keys().next_back().map_or(1, |id| id.0 + 1);
        let len = file.metadata().await?.len();

        info!(
            path = %path.display(),
            records = index.len(),
            next_id,
            "file store opened"
        );

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                path: path.clone(),
                file,
                len,
                next_id,
                index,
                failed: false,
            })),
            path,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn replay(content: &str) -> StorageResult<BTreeMap<StudentId, Student>> {
    let mut index = BTreeMap::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let student: Student = serde_json::from_str(line)
            .map_err(|source| StorageError::Corrupt { line: i + 1, source })?;
        if index.insert(student.id, student).is_some() {
            return Err(StorageError::Constraint(format!(
                "duplicate id at line {}",
                i + 1
            )));
        }
    }
    Ok(index)
}

impl Inner {
    async fn append_record(&mut self, student: ValidStudent) -> StorageResult<StudentId> {
        if self.failed {
            return Err(StorageError::Unavailable(std::io::Error::other(format!(
                "{} holds a partial write that could not be removed",
                self.path.display()
            ))));
        }

        let id = StudentId(self.next_id);
        let record = student.into_student(id);
        let mut line = serde_json::to_string(&record)
            .map_err(|e| StorageError::Constraint(e.to_string()))?;
        line.push('\n');

        if let Err(err) = append(&mut self.file, line.as_bytes()).await {
            if let Err(truncate_err) = self.file.set_len(self.len).await {
                error!(
                    path = %self.path.display(),
                    error = %truncate_err,
                    "failed to truncate partial write, refusing further writes"
                );
                self.failed = true;
            }
            return Err(err.into());
        }

        self.len += line.len() as u64;
        self.next_id += 1;
        self.index.insert(id, record);

        debug!(student_id = %id, path = %self.path.display(), "stored student to file");
        Ok(id)
    }
}

#[async_trait::async_trait]
impl Storage for FileStore {
    async fn create_student(&self, student: &ValidStudent) -> StorageResult<StudentId> {
        let mut inner = Arc::clone(&self.inner).lock_owned().await;
        let student = student.clone();

        let write = tokio::spawn(async move { inner.append_record(student).await });
        write
            .await
            .map_err(|e| StorageError::Unavailable(std::io::Error::other(e)))?
    }

    async fn get_student(&self, id: StudentId) -> StorageResult<Option<Student>> {
        let inner = self.inner.lock().await;
        Ok(inner.index.get(&id).cloned())
    }
}

async fn append(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_data().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::students::{validate, NewStudent};

    fn student(name: &str) -> ValidStudent {
        validate(NewStudent {
            name: name.into(),
            email: format!("{}@x.com", name.to_lowercase()),
            age: 30,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn creates_file_and_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("students.jsonl");

        let store = FileStore::open(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), path.as_path());
    }

    #[tokio::test]
    async fn records_are_durable_before_returning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.jsonl");
        let store = FileStore::open(&path).await.unwrap();

        let id = store.create_student(&student("Ann")).await.unwrap();
        assert_eq!(id, StudentId(1));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "{\"id\":1,\"name\":\"Ann\",\"email\":\"ann@x.com\",\"age\":30}\n"
        );
        let stored = store.get_student(id).await.unwrap().unwrap();
        assert_eq!(stored.email, "ann@x.com");
    }

    #[tokio::test]
    async fn reopen_continues_id_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.jsonl");

        {
            let store = FileStore::open(&path).await.unwrap();
            store.create_student(&student("Ann")).await.unwrap();
            store.create_student(&student("Bob")).await.unwrap();
        }

        let store = FileStore::open(&path).await.unwrap();
        let bob = store.get_student(StudentId(2)).await.unwrap().unwrap();
        assert_eq!(bob.name, "Bob");

        let id = store.create_student(&student("Cid")).await.unwrap();
        assert_eq!(id, StudentId(3));
    }

    #[tokio::test]
    async fn corrupt_line_is_reported_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.jsonl");
        std::fs::write(
            &path,
            "{\"id\":1,\"name\":\"Ann\",\"email\":\"ann@x.com\",\"age\":30}\nnot json\n",
        )
        .unwrap();

        match FileStore::open(&path).await {
            Err(StorageError::Corrupt { line, .. }) => assert_eq!(line, 2),
            Err(other) => panic!("expected corrupt error, got {other:?}"),
            Ok(_) => panic!("expected corrupt error, store opened"),
        }
    }

    #[tokio::test]
    async fn unreachable_location_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();

        // A regular file where a directory is expected.
        let result = FileStore::open(blocker.join("students.jsonl")).await;
        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn cancelled_create_does_not_reuse_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.jsonl");
        let store = FileStore::open(&path).await.unwrap();

        // Poll the create once, then drop it while the write is in flight.
        let ann = student("Ann");
        let finished = tokio::select! {
            biased;
            _ = store.create_student(&ann) => true,
            _ = std::future::ready(()) => false,
        };
        assert!(!finished);

        let id = store.create_student(&student("Bob")).await.unwrap();
        assert_eq!(id, StudentId(2));

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get_student(StudentId(1)).await.unwrap().unwrap().name, "Ann");
        assert_eq!(reopened.get_student(StudentId(2)).await.unwrap().unwrap().name, "Bob");
    }

    // /dev/full rejects every write with ENOSPC and cannot be truncated.
    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn failed_truncate_stops_further_writes() {
        let path = PathBuf::from("/dev/full");
        if !path.exists() {
            return;
        }
        let file = OpenOptions::new().append(true).open(&path).await.unwrap();
        let store = FileStore {
            inner: Arc::new(Mutex::new(Inner {
                path: path.clone(),
                file,
                len: 0,
                next_id: 1,
                index: BTreeMap::new(),
                failed: false,
            })),
            path,
        };

        let first = store.create_student(&student("Ann")).await.unwrap_err();
        assert!(matches!(first, StorageError::Exhausted(_)), "got {first:?}");
        assert!(store.inner.lock().await.failed);

        let second = store.create_student(&student("Bob")).await.unwrap_err();
        assert!(matches!(second, StorageError::Unavailable(_)), "got {second:?}");
        assert!(store.get_student(StudentId(1)).await.unwrap().is_none());
    }
}
