use crate::server::error::ErrorBody;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::Response;
use tracing::warn;

/// JSON body extractor whose rejections use the shared `{"detail": ...}` body.
///
/// Statuses match [`Json`]: 400 for malformed JSON, 415 for a missing JSON content type and
/// 422 when the payload does not fit `T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let status = rejection.status();
                let detail = rejection.body_text();
                warn!(status = status.as_u16(), detail = %detail, "Request body rejected");
                Err(ErrorBody::respond(status, detail))
            },
        }
    }
}
