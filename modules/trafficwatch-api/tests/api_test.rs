//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use trafficwatch_api::{router, AppState};
use trafficwatch_events::MemoryEventStore;

fn app(store: Arc<MemoryEventStore>) -> Router {
    router(Arc::new(AppState::new(store, Duration::from_secs(2))))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_report(body: Value) -> Request<Body> {
    Request::post("/report")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let resp = app(Arc::new(MemoryEventStore::new()))
        .oneshot(get("/health"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn report_then_query_nearby() {
    let store = Arc::new(MemoryEventStore::new());

    let (status, body) = send(
        app(store.clone()),
        post_report(json!({"type": "accident", "latitude": 40.0, "longitude": -74.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let id = body["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, body) = send(app(store.clone()), get("/events?lat=40.0&lon=-74.0&radius=5")).await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], id.as_str());
    assert_eq!(events[0]["type"], "accident");
    assert_eq!(events[0]["userId"], "anonymous");

    // ~22km away, outside the default radius
    let (status, body) = send(app(store), get("/events?lat=40.2&lon=-74.0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn invalid_type_is_bad_request() {
    let store = Arc::new(MemoryEventStore::new());
    let (status, body) = send(
        app(store.clone()),
        post_report(json!({"type": "invalid_type", "latitude": 40.0, "longitude": -74.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid event type");
    assert!(store.is_empty());
}

#[tokio::test]
async fn out_of_range_coordinates_are_bad_request() {
    let store = Arc::new(MemoryEventStore::new());

    let (status, body) = send(
        app(store.clone()),
        post_report(json!({"type": "police", "latitude": 91.0, "longitude": 0.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid latitude");

    let (status, body) = send(
        app(store.clone()),
        post_report(json!({"type": "police", "latitude": 0.0, "longitude": 181.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid longitude");

    assert!(store.is_empty());
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let req = Request::post("/report")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(Arc::new(MemoryEventStore::new())), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn missing_coordinates_are_bad_request() {
    let store = Arc::new(MemoryEventStore::new());

    for body in [
        json!({"type": "accident", "longitude": -74.0}),
        json!({"type": "accident", "latitude": 40.0}),
    ] {
        let (status, resp) = send(app(store.clone()), post_report(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "Invalid request body");
    }

    assert!(store.is_empty());
}

#[tokio::test]
async fn duplicate_report_id_is_server_error() {
    let store = Arc::new(MemoryEventStore::new());
    let body = json!({"id": "same", "type": "police", "latitude": 1.0, "longitude": 1.0});

    let (status, _) = send(app(store.clone()), post_report(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, resp) = send(app(store.clone()), post_report(body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp["error"], "Failed to save event");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn store_failure_on_report_is_server_error() {
    let store = Arc::new(MemoryEventStore::new().failing_appends());
    let (status, body) = send(
        app(store),
        post_report(json!({"type": "construction", "latitude": 1.0, "longitude": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to save event");
}

#[tokio::test]
async fn bad_query_coordinates_are_bad_request() {
    let store = Arc::new(MemoryEventStore::new());

    let (status, body) = send(app(store.clone()), get("/events?lon=-74.0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid latitude");

    let (status, body) = send(app(store), get("/events?lat=40.0&lon=west")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid longitude");
}

#[tokio::test]
async fn store_failure_on_query_is_server_error() {
    let store = Arc::new(MemoryEventStore::new().failing_scans());
    let (status, body) = send(app(store), get("/events?lat=40.0&lon=-74.0")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch events");
}

#[tokio::test]
async fn responses_are_not_cacheable() {
    let resp = app(Arc::new(MemoryEventStore::new()))
        .oneshot(get("/events?lat=0&lon=0"))
        .await
        .unwrap();
    assert_eq!(resp.headers()["cache-control"], "no-store");
}
