use axum::Router;
use axum::middleware::from_fn_with_state;
use dayqhi::features::shell;
use dayqhi::kernel::prelude::ApiState;
use dayqhi::kernel::server::limiter::{RateLimiter, rate_limit};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(
    title = "DayQHI",
    description = "Subscribe to real-time alerts for your local AQHI"
))]
struct ApiDoc;

/// JSON API with its Scalar docs at `/api`, then the HTML shell with its 404 fallback.
pub(crate) fn init(state: ApiState) -> Router {
    let limiter = RateLimiter::from_config(&state.config.rate_limit);

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(dayqhi::api_router())
        .layer(from_fn_with_state(limiter, rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone())
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/api", api_doc);

    let html_routes = shell::router()
        .fallback(shell::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Router::new().merge(openapi_routes).merge(scalar_routes).merge(html_routes)
}
