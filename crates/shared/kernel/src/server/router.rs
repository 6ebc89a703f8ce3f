use super::state::ApiState;
use super::{health, hello};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Health check and greeting routes.
pub fn system_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(health::health_handler))
        .routes(routes!(hello::hello_handler))
        .routes(routes!(hello::greet_handler))
}
