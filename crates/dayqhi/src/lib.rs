//! Facade crate for DayQHI features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization, routes and
//! migrations. Keep this crate thin: it composes other crates and holds no business logic.
//!
//! ## Usage
//! - Pass [`migrations`] to the database builder before anything touches storage.
//! - Call [`init`] to build every feature slice, then register them on `ApiState`.
//! - Mount [`api_router`] for JSON routes and [`features::shell::router`] for HTML.

use dayqhi_database::{Database, Migration};
pub use dayqhi_domain as domain;
use dayqhi_domain::config::ApiConfig;
use dayqhi_domain::registry::InitializedSlice;
use dayqhi_event_bus::EventBus;
pub use dayqhi_kernel as kernel;
use dayqhi_kernel::server::ApiState;
use std::borrow::Cow;
use utoipa_axum::router::OpenApiRouter;

/// Feature slices compiled into this build.
pub mod features {
    pub use dayqhi_alerts as alerts;
    pub use dayqhi_shell as shell;
}

#[dayqhi_derive::dayqhi_error]
pub enum PlatformError {
    #[error("Shell slice failed{}: {source}", format_context(.context))]
    Shell {
        #[source]
        source: dayqhi_shell::ShellError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Alerts slice failed{}: {source}", format_context(.context))]
    Alerts {
        #[source]
        source: dayqhi_alerts::AlertsError,
        context: Option<Cow<'static, str>>,
    },
}

/// Schema migrations of every slice, in apply order.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    features::alerts::migrations()
}

/// Initializes all feature slices.
///
/// # Errors
/// Returns the first slice that fails to initialize.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<Vec<InitializedSlice>, PlatformError> {
    let slices = vec![
        features::shell::init(config)?,
        features::alerts::init(config, database, events)?,
    ];
    Ok(slices)
}

/// System routes plus every slice's documented JSON routes.
pub fn api_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .merge(dayqhi_kernel::server::router::system_router())
        .merge(features::alerts::router())
}
