use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use dayqhi_kernel::prelude::{ApiConfig, ApiState, Database};
use dayqhi_kernel::server::limiter::{RateLimiter, rate_limit};
use dayqhi_kernel::server::router::system_router;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

async fn app(limiter: RateLimiter) -> Router {
    let database =
        Database::builder().url("mem://").session("test", "system").init().await.unwrap();
    let state = ApiState::builder().config(ApiConfig::default()).db(database).build().unwrap();

    let (router, _) = system_router().with_state(state).split_for_parts();
    router.layer(from_fn_with_state(limiter, rate_limit))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response =
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn hello_returns_static_greeting() {
    let (status, body) = get_json(app(RateLimiter::disabled()).await, "/api/hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "message": "Hello World" }));
}

#[tokio::test]
async fn hello_greets_by_name() {
    let (status, body) = get_json(app(RateLimiter::disabled()).await, "/api/hello/Ada").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello Ada");
}

#[tokio::test]
async fn health_reports_up_without_caching() {
    let response = app(RateLimiter::disabled())
        .await
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CACHE_CONTROL].to_str().unwrap().contains("no-store")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "up");
}

#[tokio::test]
async fn exhausted_budget_returns_429_with_retry_after() {
    let app = app(RateLimiter::new(1, Duration::from_secs(60))).await;
    let request = || {
        Request::builder()
            .uri("/api/hello")
            .header("x-forwarded-for", "198.51.100.7")
            .body(Body::empty())
            .unwrap()
    };

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key(header::RETRY_AFTER));

    let bytes = to_bytes(second.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["detail"].as_str().unwrap().starts_with("Rate limit exceeded"));
}

#[tokio::test]
async fn health_is_not_rate_limited() {
    let app = app(RateLimiter::new(1, Duration::from_secs(60))).await;

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
