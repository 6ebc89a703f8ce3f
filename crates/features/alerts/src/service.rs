use crate::error::{AlertsError, AlertsErrorExt};
use crate::evaluation;
use crate::geocoding::Geocoder;
use crate::model::{
    Alert, AlertTriggered, EvaluationReport, Location, NewAlert, Reading, RegisterUser, User,
    UserView,
};
use crate::notifier::Notifier;
use crate::password::hash_password_blocking;
use crate::repository::{AlertRepository, IDENTITY_TAKEN};
use chrono::Utc;
use dayqhi_event_bus::EventBus;
use dayqhi_kernel::prelude::{ALERT_TABLE, ResourceGuard};
use dayqhi_kernel::safe_nanoid;
use fxhash::FxHashMap;
use tracing::{info, instrument, warn};

/// Use cases of the alerts slice.
#[derive(Debug, Clone)]
pub struct AlertService {
    repo: AlertRepository,
    geocoder: Geocoder,
    events: EventBus,
    notifier: Notifier,
    radius_km: f64,
}

impl AlertService {
    #[must_use]
    pub const fn new(
        repo: AlertRepository,
        geocoder: Geocoder,
        events: EventBus,
        notifier: Notifier,
        radius_km: f64,
    ) -> Self {
        Self { repo, geocoder, events, notifier, radius_km }
    }

    /// # Errors
    /// * [`AlertsError::Validation`] for blank fields, a malformed email or no location.
    /// * [`AlertsError::Conflict`] when the username or email is taken, including when a
    ///   concurrent registration claims it first.
    /// * Geocoding errors when only an address is given.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register_user(&self, request: RegisterUser) -> Result<UserView, AlertsError> {
        let username = request.username.trim();
        let email = request.email.trim();

        if username.is_empty() {
            return Err(AlertsError::validation("username cannot be empty"));
        }
        if request.password.is_empty() {
            return Err(AlertsError::validation("password cannot be empty"));
        }
        if !is_plausible_email(email) {
            return Err(AlertsError::validation("email must be a valid address"));
        }

        let location = match (request.location, request.address.as_deref().map(str::trim)) {
            (Some(location), _) => location.validate()?,
            (None, Some(address)) if !address.is_empty() => self.geocoder.locate(address).await?,
            _ => return Err(AlertsError::validation("location or address is required")),
        };

        if self.repo.identity_taken(username, email).await? {
            return Err(AlertsError::conflict(IDENTITY_TAKEN));
        }

        let user = User {
            id: safe_nanoid!(),
            username: username.to_owned(),
            email: email.to_owned(),
            location,
        };
        let password_hash = hash_password_blocking(request.password).await?;
        self.repo.insert_user(&user, password_hash).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// # Errors
    /// Returns [`AlertsError::NotFound`] for an unknown username.
    pub async fn get_user(&self, username: &str) -> Result<User, AlertsError> {
        self.repo
            .user_by_username(username)
            .await?
            .ok_or_else(|| AlertsError::not_found("User not found"))
    }

    /// # Errors
    /// Returns [`AlertsError::NotFound`] for an unknown username.
    #[instrument(skip(self))]
    pub async fn update_location(
        &self,
        username: &str,
        location: Location,
    ) -> Result<(), AlertsError> {
        let location = location.validate()?;
        let user = self.get_user(username).await?;
        self.repo.set_user_location(&user.id, location).await?;

        info!(user_id = %user.id, "User location updated");
        Ok(())
    }

    /// Geocodes `address` and stores the result as the user's location.
    ///
    /// # Errors
    /// * [`AlertsError::NotFound`] for an unknown username.
    /// * [`AlertsError::NoGeocodingResult`] when the address matches nothing.
    /// * [`AlertsError::Geocoder`] or [`AlertsError::GeocoderResponse`] on upstream failures.
    #[instrument(skip(self))]
    pub async fn geocode_location(
        &self,
        username: &str,
        address: &str,
    ) -> Result<Location, AlertsError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AlertsError::validation("address cannot be empty"));
        }

        let user = self.get_user(username).await?;
        let location = self.geocoder.locate(address).await?;
        self.repo.set_user_location(&user.id, location).await?;

        info!(user_id = %user.id, "User location geocoded");
        Ok(location)
    }

    /// # Errors
    /// Returns [`AlertsError::Validation`] or [`AlertsError::NotFound`].
    #[instrument(skip(self, request), fields(alert_name = %request.alert_name))]
    pub async fn create_alert(
        &self,
        username: &str,
        request: NewAlert,
    ) -> Result<Alert, AlertsError> {
        request.validate()?;
        let owner = self.get_user(username).await?;

        let alert = Alert {
            id: safe_nanoid!(),
            owner: owner.id,
            alert_name: request.alert_name.trim().to_owned(),
            threshold: request.threshold,
            alert_method: request.alert_method,
            mobile_number: request.mobile_number.map(|n| n.trim().to_owned()),
            is_active: true,
            created_at: Utc::now(),
            location: request.location.unwrap_or(owner.location),
        };
        self.repo.insert_alert(&alert).await?;

        info!(alert_id = %alert.id, threshold = alert.threshold, "Alert created");
        Ok(alert)
    }

    /// # Errors
    /// Returns [`AlertsError::NotFound`] for an unknown username.
    pub async fn list_alerts(&self, username: &str) -> Result<Vec<Alert>, AlertsError> {
        let owner = self.get_user(username).await?;
        self.repo.alerts_for_owner(&owner.id).await
    }

    /// # Errors
    /// Returns [`AlertsError::NotFound`] unless `username` owns the alert.
    #[instrument(skip(self))]
    pub async fn set_alert_active(
        &self,
        username: &str,
        alert_id: &str,
        is_active: bool,
    ) -> Result<Alert, AlertsError> {
        let mut alert = self.owned_alert(username, alert_id).await?;
        self.repo.set_alert_active(&alert.id, is_active).await?;
        alert.is_active = is_active;

        info!(alert_id = %alert.id, is_active, "Alert updated");
        Ok(alert)
    }

    /// # Errors
    /// Returns [`AlertsError::NotFound`] unless `username` owns the alert.
    #[instrument(skip(self))]
    pub async fn delete_alert(&self, username: &str, alert_id: &str) -> Result<(), AlertsError> {
        let alert = self.owned_alert(username, alert_id).await?;
        self.repo.delete_alert(&alert.id).await?;

        info!(alert_id = %alert.id, "Alert deleted");
        Ok(())
    }

    /// Finds the alerts a reading trips and queues [`AlertTriggered`] for each.
    ///
    /// Every event goes to the notifier queue, waiting for room when it is full, and is also
    /// published on the event bus for any other subscriber.
    ///
    /// # Errors
    /// * [`AlertsError::Validation`] for a malformed reading.
    /// * [`AlertsError::Internal`] if the notifier has stopped.
    #[instrument(skip(self, reading), fields(aqhi = reading.aqhi))]
    pub async fn evaluate_reading(
        &self,
        reading: Reading,
    ) -> Result<EvaluationReport, AlertsError> {
        let reading = reading.validate()?;
        let candidates = self.repo.active_alerts_up_to(reading.aqhi).await?;
        let triggered = evaluation::triggered(candidates, &reading, self.radius_km);

        let mut emails: FxHashMap<String, Option<String>> = FxHashMap::default();
        for alert in &triggered {
            if !emails.contains_key(&alert.owner) {
                let email = self.repo.user_by_id(&alert.owner).await?.map(|user| user.email);
                emails.insert(alert.owner.clone(), email);
            }
            let Some(Some(email)) = emails.get(&alert.owner) else {
                warn!(alert_id = %alert.id, owner = %alert.owner, "Alert owner no longer exists");
                continue;
            };

            let event =
                AlertTriggered { alert: alert.clone(), aqhi: reading.aqhi, email: email.clone() };
            self.events.publish(event.clone()).context("Publishing AlertTriggered")?;
            self.notifier.notify(event).await?;
        }

        info!(triggered = triggered.len(), "Reading evaluated");
        Ok(EvaluationReport { aqhi: reading.aqhi, triggered })
    }

    async fn owned_alert(&self, username: &str, alert_id: &str) -> Result<Alert, AlertsError> {
        let key = ResourceGuard::key(alert_id, ALERT_TABLE)?;
        let owner = self.get_user(username).await?;
        self.repo
            .alert_for_owner(&key, &owner.id)
            .await?
            .ok_or_else(|| AlertsError::not_found("Alert not found"))
    }
}

fn is_plausible_email(email: &str) -> bool {
    email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_both_sides_of_the_at() {
        assert!(is_plausible_email("ada@example.com"));
        assert!(!is_plausible_email("ada.example.com"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("ada@"));
        assert!(!is_plausible_email("a da@example.com"));
    }
}
