//! Start, serve, and drain a real listener.

use std::sync::Arc;
use std::time::{Duration, Instant};

use student_service::config::ServiceConfig;
use student_service::http::HttpServer;
use student_service::lifecycle::{
    termination_channel, DrainOutcome, LifecycleCoordinator, LifecycleError, LifecycleState,
    Termination,
};
use student_service::storage::{MemoryStore, Storage};
use student_service::students::StudentId;

mod common;

#[tokio::test]
async fn serves_requests_over_tcp() {
    let store = Arc::new(MemoryStore::new());
    let service = common::start_service(store.clone(), Duration::from_secs(5)).await;
    let client = common::client();

    let ready = client.get(service.url("/api/ready")).send().await.unwrap();
    assert_eq!(ready.status(), 200);
    assert_eq!(ready.text().await.unwrap(), "welcome to student service");

    let created = client
        .post(service.url("/api/students"))
        .header("content-type", "application/json")
        .body(common::ANN)
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);
    assert!(created.headers().contains_key("x-request-id"));
    let body: serde_json::Value = created.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"id": 1}));
    assert!(store.get_student(StudentId(1)).await.unwrap().is_some());

    service.terminate.send(Termination::Interrupt).await.unwrap();
    assert_eq!(service.run.await.unwrap().unwrap(), DrainOutcome::Completed);
}

#[tokio::test]
async fn idle_drain_completes_and_stops_accepting() {
    let service = common::start_service(Arc::new(MemoryStore::new()), Duration::from_secs(5)).await;
    let mut state = service.state.clone();
    assert_eq!(*state.borrow_and_update(), LifecycleState::Serving);
    let ready_url = service.url("/api/ready");

    service.terminate.send(Termination::Terminate).await.unwrap();
    let outcome = service.run.await.unwrap().unwrap();
    assert_eq!(outcome, DrainOutcome::Completed);
    assert_eq!(*state.borrow(), LifecycleState::Stopped);

    let refused = common::client().get(ready_url).send().await;
    assert!(refused.is_err());
}

#[tokio::test]
async fn drain_waits_for_in_flight_request() {
    let store = Arc::new(common::SlowStore::new(Duration::from_millis(300)));
    let entered = store.entered.clone();
    let service = common::start_service(store.clone(), Duration::from_secs(5)).await;

    let url = service.url("/api/students");
    let request = tokio::spawn(async move {
        common::client()
            .post(url)
            .header("content-type", "application/json")
            .body(common::ANN)
            .send()
            .await
    });

    entered.notified().await;
    service.terminate.send(Termination::Interrupt).await.unwrap();

    let outcome = service.run.await.unwrap().unwrap();
    assert_eq!(outcome, DrainOutcome::Completed);

    let response = request.await.unwrap().unwrap();
    assert_eq!(response.status(), 201);
    assert!(store.get_student(StudentId(1)).await.unwrap().is_some());
}

#[tokio::test]
async fn drain_is_forced_after_grace_period() {
    let store = Arc::new(common::SlowStore::new(Duration::from_millis(800)));
    let entered = store.entered.clone();
    let service = common::start_service(store.clone(), Duration::from_millis(100)).await;
    let mut state = service.state.clone();

    let url = service.url("/api/students");
    let request = tokio::spawn(async move {
        common::client()
            .post(url)
            .header("content-type", "application/json")
            .body(common::ANN)
            .send()
            .await
    });

    entered.notified().await;
    let started = Instant::now();
    service.terminate.send(Termination::Terminate).await.unwrap();

    let outcome = service.run.await.unwrap().unwrap();
    assert_eq!(outcome, DrainOutcome::Forced { abandoned: 1 });
    assert!(started.elapsed() < Duration::from_millis(700));
    assert_eq!(*state.borrow_and_update(), LifecycleState::Stopped);

    // The abandoned request is cut off and never reaches the store.
    assert!(request.await.unwrap().is_err());
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(store.get_student(StudentId(1)).await.unwrap().is_none());
    assert_eq!(store.inner.len().await, 0);
}

#[tokio::test]
async fn bind_failure_stops_without_serving() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = occupied.local_addr().unwrap().to_string();

    let config = ServiceConfig::in_memory(&address);
    let server = HttpServer::new(Arc::new(MemoryStore::new()), &config);
    let coordinator = LifecycleCoordinator::new(&config);
    let state = coordinator.subscribe();

    let err = match coordinator.start(server).await {
        Ok(_) => panic!("bind to an occupied port should fail"),
        Err(e) => e,
    };
    assert!(matches!(err, LifecycleError::Bind(_)));
    assert_eq!(*state.borrow(), LifecycleState::Stopped);
}

#[tokio::test]
async fn closed_termination_channel_keeps_serving() {
    let config = ServiceConfig::in_memory("127.0.0.1:0");
    let server = HttpServer::new(Arc::new(MemoryStore::new()), &config);
    let serving = LifecycleCoordinator::new(&config).start(server).await.unwrap();
    let addr = serving.local_addr();

    let (terminate, termination) = termination_channel();
    drop(terminate);
    let run = tokio::spawn(serving.run_until_terminated(termination));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!run.is_finished());

    let ready = common::client()
        .get(format!("http://{addr}/api/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), 200);

    run.abort();
}

