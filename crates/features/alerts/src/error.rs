use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dayqhi_event_bus::EventBusError;
use dayqhi_kernel::prelude::{ApiStateError, ErrorBody};
use dayqhi_kernel::security::resource::ResourceGuardError;
use std::borrow::Cow;
use tracing::{error, warn};

#[dayqhi_derive::dayqhi_error]
pub enum AlertsError {
    #[error("{message}")]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("{message}")]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("{message}")]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The geocoder answered but had nothing for the address.
    #[error("{message}")]
    NoGeocodingResult { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Geolocation error{}: {source}", format_context(.context))]
    Geocoder {
        #[source]
        source: reqwest::Error,
        context: Option<Cow<'static, str>>,
    },

    /// The geocoder answered with something unusable.
    #[error("Geolocation error{}: {message}", format_context(.context))]
    GeocoderResponse { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid record id{}: {source}", format_context(.context))]
    Resource {
        #[source]
        source: ResourceGuardError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Database error{}: {source}", format_context(.context))]
    Database {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Event bus error{}: {source}", format_context(.context))]
    Events {
        #[source]
        source: EventBusError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Alerts state unavailable{}: {source}", format_context(.context))]
    State {
        #[source]
        source: ApiStateError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal alerts error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl AlertsError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound { .. } | Self::NoGeocodingResult { .. } | Self::Resource { .. } => {
                StatusCode::NOT_FOUND
            },
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Geocoder { .. } | Self::GeocoderResponse { .. } => StatusCode::BAD_GATEWAY,
            Self::Database { .. }
            | Self::Events { .. }
            | Self::State { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub(crate) fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict { message: message.into(), context: None }
    }

    pub(crate) fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }
}

impl IntoResponse for AlertsError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Alerts request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Alerts request rejected");
        }
        ErrorBody::respond(status, self.to_string())
    }
}
