//! HTTP contract tests.
//!
//! Drive the full router (middleware, handlers, error mapping) against the
//! in-memory repository with a fixed clock at 2030-01-01T00:00:00Z.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use event_registration_testing::{init_test_tracing, test_clock, InMemoryEventRepository};
use event_registration_web::{build_router, AppState, CORRELATION_ID_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const UPCOMING: &str = "2030-06-01T18:00:00Z";
const PAST: &str = "2029-12-31T18:00:00Z";

fn app() -> (Router, InMemoryEventRepository) {
    init_test_tracing();
    let repository = InMemoryEventRepository::new();
    let state = AppState::new(repository.clone(), Arc::new(test_clock()));
    (build_router(state), repository)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, id: &str, date_time: &str, capacity: u32) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/event/create",
        Some(json!({
            "id": id,
            "title": format!("Event {id}"),
            "dateTime": date_time,
            "location": "Amsterdam",
            "capacity": capacity,
        })),
    )
    .await
}

async fn register(app: &Router, event_id: &str, name: &str, email: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/event/register",
        Some(json!({ "event_id": event_id, "name": name, "email": email })),
    )
    .await
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_event() {
    let (app, _) = app();

    let (status, body) = create(&app, "rustconf", UPCOMING, 300).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Event created successfully");
    assert_eq!(body["event"]["id"], "rustconf");
    assert_eq!(body["event"]["capacity"], 300);
    assert_eq!(body["event"]["registrations"], 0);
}

#[tokio::test]
async fn test_create_duplicate_id_conflicts() {
    let (app, _) = app();
    create(&app, "rustconf", UPCOMING, 300).await;

    let (status, body) = create(&app, "rustconf", UPCOMING, 10).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Event with this ID already exists");
    assert_eq!(body["existing_event_id"], "rustconf");
}

#[tokio::test]
async fn test_create_accepts_numeric_id() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/event/create",
        Some(json!({
            "id": 42,
            "title": "Answer",
            "dateTime": "2030-02-01",
            "location": "Online",
            "capacity": 5,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["event"]["id"], "42");
}

#[tokio::test]
async fn test_create_validation_errors() {
    let (app, _) = app();
    let base = json!({
        "id": "meetup",
        "title": "Meetup",
        "dateTime": UPCOMING,
        "location": "Berlin",
        "capacity": 10,
    });

    let cases = [
        ("title", Value::Null, "All event fields are required."),
        ("location", json!("   "), "All event fields are required."),
        ("dateTime", json!("next tuesday"), "Invalid date/time format (must be ISO)."),
        ("capacity", json!(0), "Capacity must be between 1 and 1000."),
        ("capacity", json!(1001), "Capacity must be between 1 and 1000."),
        ("capacity", json!("ten"), "Capacity must be between 1 and 1000."),
    ];

    for (field, value, expected) in cases {
        let mut payload = base.clone();
        payload[field] = value;

        let (status, body) = send(&app, Method::POST, "/api/event/create", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field {field}");
        assert_eq!(body["error"], expected, "field {field}");
    }
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/event/create")
        .header("content-type", "application/json")
        .body(Body::from("{\"id\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Register
// ============================================================================

#[tokio::test]
async fn test_register_reports_remaining_capacity() {
    let (app, _) = app();
    create(&app, "meetup", UPCOMING, 3).await;

    let (status, body) = register(&app, "meetup", "Ada", "ada@example.com").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Successfully registered for event");
    assert_eq!(body["remaining_capacity"], 2);
    assert_eq!(
        body["registration"],
        json!({ "event_id": "meetup", "name": "Ada", "email": "ada@example.com" })
    );
}

#[tokio::test]
async fn test_register_missing_fields() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/event/register",
        Some(json!({ "event_id": "meetup", "email": "ada@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");
    assert_eq!(
        body["missing_fields"],
        json!({ "event_id": false, "name": true, "email": false })
    );
}

#[tokio::test]
async fn test_register_malformed_email() {
    let (app, _) = app();
    create(&app, "meetup", UPCOMING, 3).await;

    let (status, body) = register(&app, "meetup", "Ada", "ada@localhost").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email format");
    assert_eq!(body["example"], "user@example.com");
}

#[tokio::test]
async fn test_register_unknown_event() {
    let (app, _) = app();

    let (status, body) = register(&app, "nowhere", "Ada", "ada@example.com").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found");
    assert_eq!(body["event_id"], "nowhere");
}

#[tokio::test]
async fn test_register_concluded_event() {
    let (app, _) = app();
    create(&app, "yesterday", PAST, 3).await;

    let (status, body) = register(&app, "yesterday", "Ada", "ada@example.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Event has already concluded");
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
async fn test_register_beyond_capacity_rejected() {
    let (app, repository) = app();
    create(&app, "tiny", UPCOMING, 2).await;

    assert_eq!(register(&app, "tiny", "Ada", "ada@example.com").await.0, StatusCode::CREATED);
    assert_eq!(register(&app, "tiny", "Grace", "grace@example.com").await.0, StatusCode::CREATED);

    let (status, body) = register(&app, "tiny", "Linus", "linus@example.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Event is at full capacity");
    assert_eq!(body["capacity"], 2);
    assert_eq!(body["current_registrations"], 2);
    assert_eq!(body["available"], false);
    assert_eq!(repository.registrations().len(), 2);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (app, _) = app();
    create(&app, "meetup", UPCOMING, 5).await;
    register(&app, "meetup", "Ada", "ada@example.com").await;

    let (status, body) = register(&app, "meetup", "Ada Again", "ada@example.com").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered for this event");
    assert_eq!(body["email"], "ada@example.com");
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_list_events_with_registrants() {
    let (app, _) = app();
    create(&app, "later", "2030-09-01T10:00:00Z", 5).await;
    create(&app, "sooner", "2030-03-01T10:00:00Z", 5).await;
    register(&app, "later", "Ada", "ada@example.com").await;
    register(&app, "later", "Grace", "grace@example.com").await;

    let (status, body) = send(&app, Method::GET, "/api/event/get-all-events", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["events"][0]["id"], "sooner");
    assert_eq!(body["events"][0]["registered_users"], json!([]));
    assert_eq!(body["events"][1]["registrations"], 2);
    assert_eq!(
        body["events"][1]["registered_users"],
        json!([
            { "name": "Ada", "email": "ada@example.com" },
            { "name": "Grace", "email": "grace@example.com" },
        ])
    );
}

// ============================================================================
// Cancel
// ============================================================================

#[tokio::test]
async fn test_cancel_by_path() {
    let (app, repository) = app();
    create(&app, "meetup", UPCOMING, 5).await;
    register(&app, "meetup", "Ada", "ada@example.com").await;
    register(&app, "meetup", "Grace", "grace@example.com").await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/event/meetup/user/ada@example.com",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["event_id"], "meetup");
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(repository.registrations().len(), 1);

    let (_, listing) = send(&app, Method::GET, "/api/event/get-all-events", None).await;
    assert_eq!(listing["events"][0]["registrations"], 1);

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/event/meetup/user/ada@example.com",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Registration not found");
}

#[tokio::test]
async fn test_cancel_by_body() {
    let (app, _) = app();
    create(&app, "meetup", UPCOMING, 1).await;
    register(&app, "meetup", "Ada", "ada@example.com").await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/event/cancel-registration",
        Some(json!({ "event_id": "meetup", "email": "ada@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The freed seat is available again.
    let (status, body) = register(&app, "meetup", "Grace", "grace@example.com").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["remaining_capacity"], 0);
}

#[tokio::test]
async fn test_cancel_validation() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/event/cancel-registration",
        Some(json!({ "event_id": "meetup" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["missing_fields"]["email"], true);

    let (status, body) = send(&app, Method::DELETE, "/api/event/meetup/user/not-an-email", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid email format");
}

// ============================================================================
// Failures and plumbing
// ============================================================================

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let (app, repository) = app();
    repository.fail_with("connection refused");

    let (status, body) = send(&app, Method::GET, "/api/event/get-all-events", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["details"], "connection refused");
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::GET, "/api/event/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn test_health_and_ready() {
    let (app, repository) = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ready": true, "database": true }));

    repository.fail_with("down");
    let (status, _) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_responses_carry_correlation_id() {
    let (app, _) = app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
}
