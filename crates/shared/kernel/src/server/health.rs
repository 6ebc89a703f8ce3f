use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::{Json, response::IntoResponse};
use dayqhi_derive::{api_handler, api_model};
use dayqhi_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

use super::state::ApiState;

#[api_model]
/// Liveness report
pub(super) struct HealthResponse {
    /// `up`, or `degraded` when the database does not answer
    status: String,
    version: String,
    /// Seconds since the first health check
    uptime: u64,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

#[api_handler(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service is healthy", body = HealthResponse),
        (status = SERVICE_UNAVAILABLE, description = "Database unreachable", body = HealthResponse),
    ),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let (status, code) = match state.database.health().await {
        Ok(()) => ("up", StatusCode::OK),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            ("degraded", StatusCode::SERVICE_UNAVAILABLE)
        },
    };

    let body = HealthResponse {
        status: status.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime: START_TIME.elapsed().as_secs(),
    };

    (
        code,
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}
