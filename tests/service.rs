//! End-to-end tests of the router with the injection layer in front.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use posts_chaos::{
    app::{self, AppState},
    decider::Draw,
    injection::Resolver,
    store::InMemoryStore,
    threshold::ThresholdProvider,
    INJECTED_FAILURE_MESSAGE,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

const KEY: &str = "ERROR_RATE";

fn router(store: InMemoryStore, draw: Arc<dyn Draw>, excluded: &[&str]) -> Router {
    let provider = ThresholdProvider::new(Arc::new(store), KEY).unwrap();
    let state = AppState::new(Resolver::with_draw(provider, draw));
    app::router(state, excluded.iter().copied())
}

fn never_failing() -> (InMemoryStore, Router) {
    let store = InMemoryStore::new().with_parameter(KEY, "0");
    let router = router(store.clone(), Arc::new(|| 50u8), &[]);
    (store, router)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, common::json_body(response).await)
}

#[tokio::test]
async fn crud_round_trip() {
    let (_, router) = never_failing();

    let (status, created) = send(
        &router,
        Method::POST,
        "/posts",
        Some(json!({ "userId": 7, "title": "hello", "body": "first post" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["id"], 1);
    assert_eq!(created["userId"], 7);

    let (status, fetched) = send(&router, Method::GET, "/posts/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, replaced) = send(
        &router,
        Method::PUT,
        "/posts/1",
        Some(json!({ "id": 99, "title": "edited" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["id"], 1);
    assert_eq!(replaced["title"], "edited");
    assert_eq!(replaced["body"], Value::Null);

    let (status, patched) = send(
        &router,
        Method::PATCH,
        "/posts/1",
        Some(json!({ "body": "patched" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["body"], "patched");
    assert_eq!(patched["title"], Value::Null);

    let (status, list) = send(&router, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&router, Method::DELETE, "/posts/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, Method::GET, "/posts/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Post not found.");
}

#[tokio::test]
async fn unknown_posts_are_not_found() {
    let (_, router) = never_failing();

    for method in [Method::PUT, Method::PATCH] {
        let (status, _) = send(&router, method, "/posts/5", Some(json!({ "title": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, _) = send(&router, Method::DELETE, "/posts/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_error_rate_fails_every_route() {
    let store = InMemoryStore::new().with_parameter(KEY, "100");
    let router = router(store, Arc::new(|| 99u8), &[]);

    for uri in ["/posts", "/posts/1", "/health", "/unknown"] {
        let (status, body) = send(&router, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["message"], INJECTED_FAILURE_MESSAGE);
    }
}

#[tokio::test]
async fn rejected_requests_do_not_reach_handlers() {
    let store = InMemoryStore::new().with_parameter(KEY, "100");
    let router = router(store.clone(), Arc::new(|| 0u8), &[]);

    let body = json!({ "title": "lost" });
    let (status, _) = send(&router, Method::POST, "/posts", Some(body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    store.set(KEY, "0");
    let (status, list) = send(&router, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn rate_change_applies_to_next_request() {
    let (store, router) = never_failing();

    let (status, _) = send(&router, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::OK);

    store.set(KEY, "100");
    let (status, _) = send(&router, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn misconfiguration_fails_requests() {
    let store = InMemoryStore::new();
    let router = router(store.clone(), Arc::new(|| 99u8), &[]);

    let (status, body) = send(&router, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");

    store.set(KEY, "abc");
    let (status, _) = send(&router, Method::GET, "/posts", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_reports_up() {
    let (_, router) = never_failing();

    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "UP" }));
}

#[tokio::test]
async fn excluded_health_reports_down_on_its_own_decision() {
    let store = InMemoryStore::new().with_parameter(KEY, "100");
    let router = router(store.clone(), Arc::new(|| 10u8), &["/health"]);

    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "status": "DOWN" }));

    store.set(KEY, "0");
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "UP" }));

    store.remove(KEY);
    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "status": "DOWN" }));
}

#[tokio::test]
async fn concurrent_requests_follow_the_rate() {
    let store = InMemoryStore::new().with_parameter(KEY, "50");
    let next = Arc::new(std::sync::atomic::AtomicU8::new(0));
    let draw = {
        let next = next.clone();
        move || next.fetch_add(1, std::sync::atomic::Ordering::SeqCst) % 100
    };
    let router = router(store, Arc::new(draw), &[]);

    let mut handles = Vec::new();
    for _ in 0..100 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            send(&router, Method::GET, "/posts", None).await.0
        }));
    }

    let mut failed = 0;
    for handle in handles {
        if handle.await.unwrap() == StatusCode::INTERNAL_SERVER_ERROR {
            failed += 1;
        }
    }

    assert_eq!(failed, 50);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let (_, router) = never_failing();

    let (status, body) = send(&router, Method::GET, "/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
