//! Handler tests for the photo domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Request deserialization (JSON → Rust structs)
//! - Response serialization (Rust structs → JSON)
//! - Error classification to HTTP status codes

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use domain_photos::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tonic::Code;
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn raw_json_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_index_then_search_returns_items() {
    let store = InMemoryQdrant::new();
    let service = service(&store, false).await;

    let response = internal_router(service.clone())
        .oneshot(json_request(
            "POST",
            "/v1/index",
            json!({
                "items": [{
                    "path": "2023/beach.jpg",
                    "timestamp": 1_690_000_000,
                    "exif": { "Orientation": 1, "Make": "Fujifilm" },
                    "v": [0.1, 0.2, 0.3, 0.4]
                }]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "success": true }));

    let response = public_router(service)
        .oneshot(json_request(
            "POST",
            "/photos/search",
            json!({ "query": "beach", "limit": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let results: PhotoResultsResponse = json_body(response.into_body()).await;
    assert_eq!(results.items.len(), 1);
    assert_eq!(results.items[0].path, "2023/beach.jpg");
    assert_eq!(results.items[0].timestamp, Some(1_690_000_000));
}

#[tokio::test]
async fn test_search_with_embedding_down_returns_503() {
    let store = InMemoryQdrant::new();
    let app = public_router(service(&store, true).await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/photos/search",
            json!({ "query": "beach" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], "embedding_server_unavailable");
    assert_eq!(body["message"], "embedding server unavailable");
}

#[tokio::test]
async fn test_search_with_store_down_returns_503() {
    let store = InMemoryQdrant::new();
    let app = public_router(service(&store, false).await);
    store.fail_with(Code::DeadlineExceeded);

    let response = app
        .oneshot(json_request(
            "POST",
            "/photos/search",
            json!({ "query": "beach" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], "vector_database_unavailable");
}

#[tokio::test]
async fn test_store_rejection_returns_500() {
    let store = InMemoryQdrant::new();
    let app = public_router(service(&store, false).await);
    store.fail_with(Code::InvalidArgument);

    let response = app
        .oneshot(json_request(
            "POST",
            "/photos/search",
            json!({ "query": "beach" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], "vector_database_error");
}

#[tokio::test]
async fn test_recommend_with_malformed_id_returns_400() {
    let store = InMemoryQdrant::new();
    let app = public_router(service(&store, false).await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/photos/recommend",
            json!({ "id": "zzz" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_search_with_mistyped_limit_returns_400() {
    let store = InMemoryQdrant::new();
    let app = public_router(service(&store, false).await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/photos/search",
            json!({ "query": "x", "limit": "ten" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], "invalid_request");
    assert!(body["message"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn test_malformed_index_body_returns_400() {
    let store = InMemoryQdrant::new();
    let app = internal_router(service(&store, false).await);

    let response = app
        .oneshot(raw_json_request("POST", "/v1/index", "{\"items\": ["))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_list_index_with_bad_size_returns_400() {
    let store = InMemoryQdrant::new();
    let app = internal_router(service(&store, false).await);

    let response = app.oneshot(get_request("/v1/index?size=abc")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], "invalid_request");
}

#[tokio::test]
async fn test_exponent_exif_number_is_not_stored() {
    let store = InMemoryQdrant::new();
    let service = service(&store, false).await;

    let response = internal_router(service.clone())
        .oneshot(raw_json_request(
            "POST",
            "/v1/index",
            r#"{"items": [{"path": "e.jpg", "exif": {"Orientation": 6e0, "Make": "Sony"}, "v": [0.1, 0.2, 0.3, 0.4]}]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let uri = format!("/photos/{}", derive_id("e.jpg").to_hex());
    let response = public_router(service).oneshot(get_request(&uri)).await.unwrap();
    let details: PhotoDetails = json_body(response.into_body()).await;
    assert_eq!(details.orientation, None);
    assert_eq!(details.camera.as_deref(), Some("Sony"));
}

#[tokio::test]
async fn test_get_photo_details() {
    let store = InMemoryQdrant::new();
    let service = service(&store, false).await;
    service
        .upsert(vec![
            photo("a/b.jpg")
                .with_timestamp(1_700_000_000)
                .with_exif("Orientation", DynamicValue::Float(6.0)),
        ])
        .await
        .unwrap();

    let uri = format!("/photos/{}", derive_id("a/b.jpg").to_hex());
    let response = public_router(service).oneshot(get_request(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let details: PhotoDetails = json_body(response.into_body()).await;
    assert_eq!(details.id, derive_id("a/b.jpg").to_string());
    assert_eq!(details.path, "a/b.jpg");
    assert_eq!(details.orientation, Some(6));
    assert_eq!(details.camera, None);
}

#[tokio::test]
async fn test_get_unknown_photo_returns_404() {
    let store = InMemoryQdrant::new();
    let app = public_router(service(&store, false).await);

    let uri = format!("/photos/{}", derive_id("missing.jpg"));
    let response = app.oneshot(get_request(&uri)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_list_and_delete_index() {
    let store = InMemoryQdrant::new();
    let service = service(&store, false).await;
    service
        .upsert(vec![photo("a.jpg"), photo("b.jpg")])
        .await
        .unwrap();

    let response = internal_router(service.clone())
        .oneshot(get_request("/v1/index?size=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: PhotoPathsResponse = json_body(response.into_body()).await;
    assert_eq!(page.paths.len(), 2);
    assert_eq!(page.next_offset, None);

    let response = internal_router(service)
        .oneshot(json_request(
            "DELETE",
            "/v1/index",
            json!({ "items": ["a.jpg"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_health_echoes_type() {
    let store = InMemoryQdrant::new();
    let app = internal_router(service(&store, false).await);

    let response = app.oneshot(get_request("/_health/readiness")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({ "status": "healthy", "type": "readiness" }));
}
