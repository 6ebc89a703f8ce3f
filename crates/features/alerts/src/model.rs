use crate::error::AlertsError;
use chrono::{DateTime, Utc};
use dayqhi_derive::api_model;
use dayqhi_domain::constants::{AQHI_MAX, AQHI_MIN};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// WGS84 point.
#[api_model]
#[derive(Clone, Copy, PartialEq)]
pub struct Location {
    /// Degrees, -90 to 90
    pub latitude: f64,
    /// Degrees, -180 to 180
    pub longitude: f64,
}

impl Location {
    /// # Errors
    /// Returns [`AlertsError::Validation`] for non-finite or out-of-range coordinates.
    pub fn validate(self) -> Result<Self, AlertsError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);

        if lat_ok && lon_ok {
            Ok(self)
        } else {
            Err(AlertsError::validation(format!(
                "Invalid location ({}, {}): latitude must be within [-90, 90] \
                 and longitude within [-180, 180]",
                self.latitude, self.longitude
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertMethod {
    #[default]
    Email,
    Sms,
}

/// Registration request. `location` wins over `address`; one of them is required.
#[api_model]
pub struct RegisterUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub location: Option<Location>,
    /// Free-form address resolved through the geocoder
    pub address: Option<String>,
}

/// A stored user. The password hash never leaves the crate.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub location: Location,
}

/// Public view of a user.
#[api_model]
#[derive(Clone, PartialEq)]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub location: Location,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self { id: user.id, username: user.username, email: user.email, location: user.location }
    }
}

#[api_model]
pub struct AddressUpdate {
    pub address: String,
}

#[api_model]
pub struct NewAlert {
    pub alert_name: String,
    /// AQHI level (1 to 11, where 11 means "10+") at or above which the alert fires
    pub threshold: u8,
    pub alert_method: Option<AlertMethod>,
    /// Required when `alert_method` is `sms`
    pub mobile_number: Option<String>,
    /// Defaults to the owner's location
    pub location: Option<Location>,
}

impl NewAlert {
    /// # Errors
    /// Returns [`AlertsError::Validation`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), AlertsError> {
        if self.alert_name.trim().is_empty() {
            return Err(AlertsError::validation("alert_name cannot be empty"));
        }
        validate_aqhi("threshold", self.threshold)?;

        let has_mobile = self.mobile_number.as_deref().is_some_and(|n| !n.trim().is_empty());
        if self.alert_method == Some(AlertMethod::Sms) && !has_mobile {
            return Err(AlertsError::validation("mobile_number is required for sms alerts"));
        }

        if let Some(location) = self.location {
            location.validate()?;
        }
        Ok(())
    }
}

#[api_model]
#[derive(Clone, PartialEq)]
pub struct Alert {
    pub id: String,
    /// Owning user id
    pub owner: String,
    pub alert_name: String,
    pub threshold: u8,
    pub alert_method: Option<AlertMethod>,
    pub mobile_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub location: Location,
}

impl Alert {
    /// Delivery channel; alerts without a method are sent by email.
    #[must_use]
    pub fn method(&self) -> AlertMethod {
        self.alert_method.unwrap_or_default()
    }
}

#[api_model]
pub struct AlertUpdate {
    pub is_active: bool,
}

/// An observed AQHI value at a location.
#[api_model]
#[derive(Clone, Copy)]
pub struct Reading {
    pub location: Location,
    pub aqhi: u8,
}

impl Reading {
    /// # Errors
    /// Returns [`AlertsError::Validation`] for an out-of-scale AQHI or a bad location.
    pub fn validate(self) -> Result<Self, AlertsError> {
        validate_aqhi("aqhi", self.aqhi)?;
        self.location.validate()?;
        Ok(self)
    }
}

#[api_model]
pub struct EvaluationReport {
    pub aqhi: u8,
    pub triggered: Vec<Alert>,
}

/// Published for every alert a reading trips.
#[derive(Debug, Clone)]
pub struct AlertTriggered {
    pub alert: Alert,
    pub aqhi: u8,
    /// Owner's email address
    pub email: String,
}

fn validate_aqhi(field: &str, value: u8) -> Result<(), AlertsError> {
    if (AQHI_MIN..=AQHI_MAX).contains(&value) {
        Ok(())
    } else {
        Err(AlertsError::validation(format!("{field} must be between {AQHI_MIN} and {AQHI_MAX}")))
    }
}
