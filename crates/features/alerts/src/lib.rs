//! Alerts feature slice.
//!
//! Users register with a location (or an address resolved through a Nominatim-compatible
//! geocoder) and subscribe to AQHI alerts. Readings pushed to `/api/readings` are matched
//! against active alerts by threshold and distance; every match is published as
//! [`AlertTriggered`] and queued for the background [`notifier`].

mod error;
pub mod evaluation;
pub mod geocoding;
mod handlers;
pub mod model;
pub mod notifier;
mod password;
pub mod repository;
pub mod service;

pub use crate::error::{AlertsError, AlertsErrorExt};
pub use crate::geocoding::Geocoder;
pub use crate::model::{
    AddressUpdate, Alert, AlertMethod, AlertTriggered, AlertUpdate, EvaluationReport, Location,
    NewAlert, Reading, RegisterUser, User, UserView,
};
pub use crate::notifier::Notifier;
pub use crate::repository::AlertRepository;
pub use crate::service::AlertService;

use dayqhi_database::Migration;
use dayqhi_kernel::prelude::{ApiConfig, ApiState, Database, EventBus, InitializedSlice};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

const SLICE: &str = "alerts";

#[dayqhi_derive::dayqhi_slice]
pub struct Alerts {
    pub service: AlertService,
}

/// Schema migrations owned by this slice, in apply order.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new(SLICE, "0001", include_str!("../migrations/0001_init.surql"))]
}

/// Wires the repository, geocoder and notifier.
///
/// Must be called inside a Tokio runtime; the notifier runs as a spawned task until the
/// slice is dropped.
///
/// # Errors
/// Fails when the geocoder client cannot be built or the notifier capacity is zero.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<InitializedSlice, AlertsError> {
    let geocoder = Geocoder::new(&config.geocoder)?;
    let repo = AlertRepository::new(database.clone());
    let (notifier, _task) =
        Notifier::spawn(config.alerts.channel_capacity).context("Starting notifier")?;
    let service =
        AlertService::new(repo, geocoder, events.clone(), notifier, config.alerts.radius_km);

    tracing::info!(
        radius_km = config.alerts.radius_km,
        geocoder = %config.geocoder.url,
        "Alerts slice initialized"
    );

    Ok(InitializedSlice::new(Alerts::new(AlertsInner { service })))
}

/// JSON API routes for users, alerts and readings.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::register_user))
        .routes(routes!(handlers::get_user))
        .routes(routes!(handlers::update_location))
        .routes(routes!(handlers::geocode_location))
        .routes(routes!(handlers::create_alert, handlers::list_alerts))
        .routes(routes!(handlers::set_alert_active, handlers::delete_alert))
        .routes(routes!(handlers::evaluate_reading))
}
