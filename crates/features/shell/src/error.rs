use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dayqhi_kernel::prelude::{ApiStateError, ErrorBody};
use std::borrow::Cow;

#[dayqhi_derive::dayqhi_error]
pub enum ShellError {
    #[error("Invalid font{}: {message}", format_context(.context))]
    Font { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid site config{}: {message}", format_context(.context))]
    Config { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Shell state unavailable{}: {source}", format_context(.context))]
    State { source: ApiStateError, context: Option<Cow<'static, str>> },
}

impl ShellError {
    pub(crate) fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Config { message: message.into(), context: None }
    }
}

impl IntoResponse for ShellError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Shell request failed");
        ErrorBody::respond(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
    }
}
