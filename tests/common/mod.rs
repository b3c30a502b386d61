//! Shared test harness: the full router over in-memory stores, plus request
//! helpers driving it through tower's ServiceExt.

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower::ServiceExt;

use catalog_api::{
    common_routes, resource_routes, Category, Genre, LifecycleController, MemoryStore,
};

/// The router plus direct controller handles for seeding rows, the way the
/// production binary wires them in `main.rs`.
pub struct TestApp {
    pub router: Router,
    pub categories: LifecycleController<Category>,
    pub genres: LifecycleController<Genre>,
}

pub fn build_test_app() -> TestApp {
    let categories = LifecycleController::new(Arc::new(MemoryStore::<Category>::default()));
    let genres = LifecycleController::new(Arc::new(MemoryStore::<Genre>::default()));
    let router = Router::new()
        .merge(common_routes())
        .nest("/categories", resource_routes(categories.clone()))
        .nest("/genres", resource_routes(genres.clone()));
    TestApp {
        router,
        categories,
        genres,
    }
}

/// Payload builder for controller-level seeding.
#[allow(dead_code)]
pub fn attrs(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub async fn get(router: &Router, uri: &str) -> Response {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

#[allow(dead_code)]
pub async fn post_json(router: &Router, uri: &str, body: Value) -> Response {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
pub async fn put_json(router: &Router, uri: &str, body: Value) -> Response {
    send(
        router,
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
pub async fn post_empty(router: &Router, uri: &str) -> Response {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
pub async fn delete(router: &Router, uri: &str) -> Response {
    send(
        router,
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
