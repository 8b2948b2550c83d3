use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use skywatch_core::memory::{MemoryInterestStore, MemoryUserStore};
use skywatch_core::repository::{InterestRepository, UserRepository};
use skywatch_core::{CoreError, CoreResult, InterestCleanup};
use skywatch_users::{app, AppState};

struct TimedOutCollector;

#[async_trait]
impl InterestCleanup for TimedOutCollector {
    async fn purge_interests(&self, _email: &str) -> CoreResult<u64> {
        Err(CoreError::PartnerUnavailable("operation timed out".to_string()))
    }
}

fn router(users: Arc<MemoryUserStore>, cleanup: Arc<dyn InterestCleanup>) -> Router {
    app(AppState::new(users, cleanup))
}

fn register_request(request_id: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json");
    if let Some(id) = request_id {
        builder = builder.header("X-Request-ID", id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_register_retry_scenario() {
    let users = Arc::new(MemoryUserStore::new());
    let router = router(users.clone(), Arc::new(MemoryInterestStore::new()));
    let body = json!({ "email": "a@x.com", "username": "alice" });

    let (status, first) = send(&router, register_request(Some("R1"), body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["status"], "CREATED");
    assert_eq!(first["message"], "User registered successfully");

    let (status, second) = send(&router, register_request(Some("R1"), body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["status"], "IDEMPOTENT_REPLAY");

    let (status, third) = send(&router, register_request(Some("R2"), body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(third["status"], "ALREADY_EXISTED");
    assert_eq!(third["message"], "User already exists");

    assert_eq!(users.user_count(), 1);
}

#[tokio::test]
async fn test_register_with_uuid_request_id() {
    let users = Arc::new(MemoryUserStore::new());
    let router = router(users.clone(), Arc::new(MemoryInterestStore::new()));
    let id = uuid::Uuid::new_v4().to_string();

    let (status, _) = send(&router, register_request(Some(&id), json!({ "email": "u@x.com", "username": "u" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(users.exists("u@x.com").await.unwrap());
}

#[tokio::test]
async fn test_register_requires_request_id() {
    let users = Arc::new(MemoryUserStore::new());
    let router = router(users.clone(), Arc::new(MemoryInterestStore::new()));

    let (status, body) = send(
        &router,
        register_request(None, json!({ "email": "a@x.com", "username": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing X-Request-ID header");
    assert_eq!(users.user_count(), 0);
}

#[tokio::test]
async fn test_register_requires_fields() {
    let users = Arc::new(MemoryUserStore::new());
    let router = router(users.clone(), Arc::new(MemoryInterestStore::new()));

    let (status, _) = send(&router, register_request(Some("R1"), json!({ "email": "a@x.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, register_request(Some("R2"), json!({ "username": "alice" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let malformed = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .header("X-Request-ID", "R3")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&router, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(users.user_count(), 0);
    assert_eq!(users.ledger_len(), 0);
}

#[tokio::test]
async fn test_delete_cascades_to_interests() {
    let users = Arc::new(MemoryUserStore::new());
    let interests = Arc::new(MemoryInterestStore::new());
    interests.insert("a@x.com", "LIRF").await.unwrap();
    let router = router(users.clone(), interests.clone());

    send(&router, register_request(Some("R1"), json!({ "email": "a@x.com", "username": "alice" }))).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/users/a@x.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
    assert_eq!(body["interests_removed"], 1);
    assert!(!users.exists("a@x.com").await.unwrap());
    assert!(interests.list_for_user("a@x.com").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_survives_collector_timeout() {
    let users = Arc::new(MemoryUserStore::new());
    let router = router(users.clone(), Arc::new(TimedOutCollector));

    send(&router, register_request(Some("R1"), json!({ "email": "a@x.com", "username": "alice" }))).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/users/a@x.com")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);
    assert!(body["interests_removed"].is_null());
    assert!(!users.exists("a@x.com").await.unwrap());
}

#[tokio::test]
async fn test_register_rejects_oversized_email() {
    let users = Arc::new(MemoryUserStore::new());
    let router = router(users.clone(), Arc::new(MemoryInterestStore::new()));
    let email = format!("{}@x.com", "a".repeat(250));

    let (status, body) = send(
        &router,
        register_request(Some("R1"), json!({ "email": email, "username": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(users.ledger_len(), 0);
}
