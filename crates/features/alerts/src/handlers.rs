use crate::Alerts;
use crate::error::{AlertsError, AlertsErrorExt};
use crate::model::{
    AddressUpdate, Alert, AlertUpdate, EvaluationReport, Location, NewAlert, Reading,
    RegisterUser, UserView,
};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use dayqhi_derive::api_handler;
use dayqhi_kernel::prelude::{
    ALERTS_TAG, ApiJson, ApiState, ErrorBody, READINGS_TAG, USERS_TAG,
};

fn alerts(state: &ApiState) -> Result<&Alerts, AlertsError> {
    state.try_get_slice::<Alerts>().context("Alerts slice is not registered")
}

#[api_handler(
    post,
    path = "/api/users",
    request_body = RegisterUser,
    responses(
        (status = CREATED, description = "User registered", body = UserView),
        (status = NOT_FOUND, description = "Address could not be geocoded", body = ErrorBody),
        (status = CONFLICT, description = "Username or email taken", body = ErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid registration", body = ErrorBody),
        (status = BAD_GATEWAY, description = "Geocoder failure", body = ErrorBody),
    ),
    tag = USERS_TAG,
)]
pub(crate) async fn register_user(
    State(state): State<ApiState>,
    ApiJson(request): ApiJson<RegisterUser>,
) -> Result<(StatusCode, Json<UserView>), AlertsError> {
    let user = alerts(&state)?.service.register_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[api_handler(
    get,
    path = "/api/users/{username}",
    params(("username" = String, Path, description = "Registered username")),
    responses(
        (status = OK, description = "User", body = UserView),
        (status = NOT_FOUND, description = "Unknown user", body = ErrorBody),
    ),
    tag = USERS_TAG,
)]
pub(crate) async fn get_user(
    State(state): State<ApiState>,
    Path(username): Path<String>,
) -> Result<Json<UserView>, AlertsError> {
    let user = alerts(&state)?.service.get_user(&username).await?;
    Ok(Json(user.into()))
}

#[api_handler(
    put,
    path = "/api/users/{username}/location",
    params(("username" = String, Path, description = "Registered username")),
    request_body = Location,
    responses(
        (status = NO_CONTENT, description = "Location stored"),
        (status = NOT_FOUND, description = "Unknown user", body = ErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "Coordinates out of range", body = ErrorBody),
    ),
    tag = USERS_TAG,
)]
pub(crate) async fn update_location(
    State(state): State<ApiState>,
    Path(username): Path<String>,
    ApiJson(location): ApiJson<Location>,
) -> Result<StatusCode, AlertsError> {
    alerts(&state)?.service.update_location(&username, location).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    put,
    path = "/api/users/{username}/address",
    params(("username" = String, Path, description = "Registered username")),
    request_body = AddressUpdate,
    responses(
        (status = OK, description = "Resolved and stored location", body = Location),
        (status = NOT_FOUND, description = "Unknown user or no geocoding result", body = ErrorBody),
        (status = BAD_GATEWAY, description = "Geocoder failure", body = ErrorBody),
    ),
    tag = USERS_TAG,
)]
pub(crate) async fn geocode_location(
    State(state): State<ApiState>,
    Path(username): Path<String>,
    ApiJson(update): ApiJson<AddressUpdate>,
) -> Result<Json<Location>, AlertsError> {
    let location = alerts(&state)?.service.geocode_location(&username, &update.address).await?;
    Ok(Json(location))
}

#[api_handler(
    post,
    path = "/api/users/{username}/alerts",
    params(("username" = String, Path, description = "Alert owner")),
    request_body = NewAlert,
    responses(
        (status = CREATED, description = "Alert created", body = Alert),
        (status = NOT_FOUND, description = "Unknown user", body = ErrorBody),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid alert", body = ErrorBody),
    ),
    tag = ALERTS_TAG,
)]
pub(crate) async fn create_alert(
    State(state): State<ApiState>,
    Path(username): Path<String>,
    ApiJson(request): ApiJson<NewAlert>,
) -> Result<(StatusCode, Json<Alert>), AlertsError> {
    let alert = alerts(&state)?.service.create_alert(&username, request).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

#[api_handler(
    get,
    path = "/api/users/{username}/alerts",
    params(("username" = String, Path, description = "Alert owner")),
    responses(
        (status = OK, description = "Alerts, oldest first", body = Vec<Alert>),
        (status = NOT_FOUND, description = "Unknown user", body = ErrorBody),
    ),
    tag = ALERTS_TAG,
)]
pub(crate) async fn list_alerts(
    State(state): State<ApiState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Alert>>, AlertsError> {
    Ok(Json(alerts(&state)?.service.list_alerts(&username).await?))
}

#[api_handler(
    patch,
    path = "/api/users/{username}/alerts/{id}",
    params(
        ("username" = String, Path, description = "Alert owner"),
        ("id" = String, Path, description = "Alert id"),
    ),
    request_body = AlertUpdate,
    responses(
        (status = OK, description = "Updated alert", body = Alert),
        (status = NOT_FOUND, description = "Alert not owned by user", body = ErrorBody),
    ),
    tag = ALERTS_TAG,
)]
pub(crate) async fn set_alert_active(
    State(state): State<ApiState>,
    Path((username, id)): Path<(String, String)>,
    ApiJson(update): ApiJson<AlertUpdate>,
) -> Result<Json<Alert>, AlertsError> {
    let alert =
        alerts(&state)?.service.set_alert_active(&username, &id, update.is_active).await?;
    Ok(Json(alert))
}

#[api_handler(
    delete,
    path = "/api/users/{username}/alerts/{id}",
    params(
        ("username" = String, Path, description = "Alert owner"),
        ("id" = String, Path, description = "Alert id"),
    ),
    responses(
        (status = NO_CONTENT, description = "Alert deleted"),
        (status = NOT_FOUND, description = "Alert not owned by user", body = ErrorBody),
    ),
    tag = ALERTS_TAG,
)]
pub(crate) async fn delete_alert(
    State(state): State<ApiState>,
    Path((username, id)): Path<(String, String)>,
) -> Result<StatusCode, AlertsError> {
    alerts(&state)?.service.delete_alert(&username, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    post,
    path = "/api/readings",
    request_body = Reading,
    responses(
        (status = OK, description = "Alerts tripped by the reading", body = EvaluationReport),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid reading", body = ErrorBody),
    ),
    tag = READINGS_TAG,
)]
pub(crate) async fn evaluate_reading(
    State(state): State<ApiState>,
    ApiJson(reading): ApiJson<Reading>,
) -> Result<Json<EvaluationReport>, AlertsError> {
    Ok(Json(alerts(&state)?.service.evaluate_reading(reading).await?))
}
