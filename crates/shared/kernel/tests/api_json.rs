use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::routing::post;
use dayqhi_kernel::prelude::ApiJson;
use serde_json::Value;
use std::collections::HashMap;
use tower::ServiceExt;

async fn total(ApiJson(counts): ApiJson<HashMap<String, u32>>) -> String {
    counts.values().sum::<u32>().to_string()
}

async fn send(content_type: Option<&str>, body: &str) -> (StatusCode, Vec<u8>) {
    let app = Router::new().route("/counts", post(total));
    let mut request = Request::builder().method(Method::POST).uri("/counts");
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }

    let response =
        app.oneshot(request.body(Body::from(body.to_owned())).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn detail(bytes: &[u8]) -> String {
    let body: Value = serde_json::from_slice(bytes).unwrap();
    body["detail"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn valid_body_reaches_the_handler() {
    let (status, bytes) = send(Some("application/json"), r#"{"a": 2, "b": 3}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"5");
}

#[tokio::test]
async fn wrong_shape_is_unprocessable_with_detail() {
    let (status, bytes) = send(Some("application/json"), r#"{"a": "two"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!detail(&bytes).is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request_with_detail() {
    let (status, bytes) = send(Some("application/json"), r#"{"a": "#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!detail(&bytes).is_empty());
}

#[tokio::test]
async fn missing_content_type_is_unsupported_with_detail() {
    let (status, bytes) = send(None, r#"{"a": 2}"#).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(detail(&bytes).contains("Content-Type"));
}
