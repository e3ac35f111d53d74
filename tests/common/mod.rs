//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use student_service::config::ServiceConfig;
use student_service::http::HttpServer;
use student_service::lifecycle::{
    termination_channel, DrainOutcome, LifecycleCoordinator, LifecycleError, LifecycleState,
    Termination,
};
use student_service::storage::{MemoryStore, Storage, StorageError, StorageResult};
use student_service::students::{Student, StudentId, ValidStudent};
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;

pub const ANN: &str = r#"{"name":"Ann","email":"ann@x.com","age":30}"#;

/// A store whose backend is unreachable.
pub struct UnreachableStore {
    pub calls: AtomicUsize,
}

impl UnreachableStore {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }
}

#[async_trait::async_trait]
impl Storage for UnreachableStore {
    async fn create_student(&self, _student: &ValidStudent) -> StorageResult<StudentId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused by db at 10.0.0.7:5432",
        )))
    }

    async fn get_student(&self, _id: StudentId) -> StorageResult<Option<Student>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Unavailable(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused by db at 10.0.0.7:5432",
        )))
    }
}

/// Wraps a [`MemoryStore`] and sleeps before every create.
///
/// `entered` is notified as soon as a create call starts, so tests can act
/// while the request is known to be in flight.
pub struct SlowStore {
    pub inner: MemoryStore,
    pub delay: Duration,
    pub entered: Arc<Notify>,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
            entered: Arc::new(Notify::new()),
        }
    }
}

#[async_trait::async_trait]
impl Storage for SlowStore {
    async fn create_student(&self, student: &ValidStudent) -> StorageResult<StudentId> {
        self.entered.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.create_student(student).await
    }

    async fn get_student(&self, id: StudentId) -> StorageResult<Option<Student>> {
        self.inner.get_student(id).await
    }
}

/// A service running on an ephemeral port.
pub struct RunningService {
    pub addr: SocketAddr,
    pub terminate: mpsc::Sender<Termination>,
    pub state: watch::Receiver<LifecycleState>,
    pub run: JoinHandle<Result<DrainOutcome, LifecycleError>>,
}

impl RunningService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the full coordinator around `storage` on `127.0.0.1:0`.
pub async fn start_service(storage: Arc<dyn Storage>, grace: Duration) -> RunningService {
    let config = ServiceConfig::in_memory("127.0.0.1:0");
    let server = HttpServer::new(storage, &config);
    let coordinator = LifecycleCoordinator::new(&config).with_grace_period(grace);
    let state = coordinator.subscribe();

    let serving = coordinator.start(server).await.expect("service should start");
    let addr = serving.local_addr();
    let (terminate, termination) = termination_channel();
    let run = tokio::spawn(serving.run_until_terminated(termination));

    RunningService {
        addr,
        terminate,
        state,
        run,
    }
}

/// HTTP client that does not reuse connections between tests.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
