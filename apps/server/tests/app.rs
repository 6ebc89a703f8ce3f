use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use dayqhi_server::Server;
use tower::ServiceExt;

async fn app() -> Router {
    Server::builder().build().await.unwrap().router()
}

async fn get(app: Router, uri: &str) -> (StatusCode, String, String) {
    let response =
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_owned())
        .unwrap_or_default();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn landing_page_uses_the_root_shell() {
    let (status, content_type, html) = get(app().await, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\">"));
    assert!(html.contains("<title>DayQHI</title>"));
    assert!(html.contains("<body class=\"__className_"));
}

#[tokio::test]
async fn unknown_paths_render_the_not_found_page() {
    let (status, _, html) = get(app().await, "/no/such/page").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("<title>Not Found</title>"));
}

#[tokio::test]
async fn api_docs_and_routes_are_mounted() {
    let app = app().await;

    let (status, _, docs) = get(app.clone(), "/api").await;
    assert_eq!(status, StatusCode::OK);
    assert!(docs.contains("/api/readings"));

    let (status, _, body) = get(app.clone(), "/api/hello").await;
    assert_eq!(status, StatusCode::OK);
    let greeting: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(greeting["message"], "Hello World");

    let (status, _, _) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn stylesheet_carries_the_font_rule() {
    let (status, content_type, css) = get(app().await, "/globals.css").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/css"));
    assert!(css.contains(".__className_"));
}
