use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dayqhi_derive::api_model;

/// Body of every error response: `{"detail": "..."}`.
#[api_model]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self { detail: detail.into() }
    }

    /// Builds the response; 5xx details are replaced by a generic message.
    #[must_use]
    pub fn respond(status: StatusCode, detail: impl Into<String>) -> Response {
        let body = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            Self::new("Internal server error")
        } else {
            Self::new(detail)
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_detail() {
        let json = serde_json::to_value(ErrorBody::new("User not found")).unwrap();
        assert_eq!(json, serde_json::json!({ "detail": "User not found" }));
    }

    #[test]
    fn internal_details_are_hidden() {
        let response = ErrorBody::respond(StatusCode::INTERNAL_SERVER_ERROR, "db exploded");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
