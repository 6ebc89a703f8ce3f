use crate::error::{AlertsError, AlertsErrorExt};
use crate::model::{Alert, AlertMethod, Location, User};
use chrono::{DateTime, Utc};
use dayqhi_database::Database;
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub(crate) const IDENTITY_TAKEN: &str = "Username or email already registered";

const USER_FIELDS: &str = "record::id(id) AS id, username, email, latitude, longitude";
const ALERT_FIELDS: &str = "record::id(id) AS id, owner, alert_name, threshold, alert_method, \
                            mobile_number, is_active, created_at, latitude, longitude";

#[derive(Debug, Deserialize)]
struct UserRow {
    id: String,
    username: String,
    email: String,
    latitude: f64,
    longitude: f64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            location: Location { latitude: row.latitude, longitude: row.longitude },
        }
    }
}

#[derive(Debug, Serialize)]
struct UserContent {
    username: String,
    password_hash: String,
    email: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct AlertRow {
    #[serde(skip_serializing)]
    id: String,
    owner: String,
    alert_name: String,
    threshold: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert_method: Option<AlertMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile_number: Option<String>,
    is_active: bool,
    /// Unix milliseconds
    created_at: i64,
    latitude: f64,
    longitude: f64,
}

impl TryFrom<AlertRow> for Alert {
    type Error = AlertsError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        let created_at =
            DateTime::<Utc>::from_timestamp_millis(row.created_at).ok_or_else(|| {
                AlertsError::Internal {
                    message: format!("Invalid created_at {}", row.created_at).into(),
                    context: Some(format!("alert {}", row.id).into()),
                }
            })?;

        Ok(Self {
            id: row.id,
            owner: row.owner,
            alert_name: row.alert_name,
            threshold: row.threshold,
            alert_method: row.alert_method,
            mobile_number: row.mobile_number,
            is_active: row.is_active,
            created_at,
            location: Location { latitude: row.latitude, longitude: row.longitude },
        })
    }
}

impl From<&Alert> for AlertRow {
    fn from(alert: &Alert) -> Self {
        Self {
            id: alert.id.clone(),
            owner: alert.owner.clone(),
            alert_name: alert.alert_name.clone(),
            threshold: alert.threshold,
            alert_method: alert.alert_method,
            mobile_number: alert.mobile_number.clone(),
            is_active: alert.is_active,
            created_at: alert.created_at.timestamp_millis(),
            latitude: alert.location.latitude,
            longitude: alert.location.longitude,
        }
    }
}

/// Unique index hits on `user` and lost write races both mean the identity is taken.
fn is_identity_clash(message: &str) -> bool {
    ["`user_username`", "`user_email`", "read or write conflict"]
        .iter()
        .any(|needle| message.contains(needle))
}

fn into_alerts(rows: Vec<AlertRow>) -> Result<Vec<Alert>, AlertsError> {
    rows.into_iter().map(Alert::try_from).collect()
}

/// `SurrealDB` persistence for users and alerts.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    db: Database,
}

impl AlertRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// # Errors
    /// * [`AlertsError::Conflict`] when a unique index on username or email rejects the row, or
    ///   a concurrent insert wins the transaction.
    /// * [`AlertsError::Database`] on any other database error.
    #[instrument(skip(self, user, password_hash), fields(username = %user.username))]
    pub async fn insert_user(&self, user: &User, password_hash: String) -> Result<(), AlertsError> {
        let content = UserContent {
            username: user.username.clone(),
            password_hash,
            email: user.email.clone(),
            latitude: user.location.latitude,
            longitude: user.location.longitude,
        };

        self.db
            .query("CREATE type::thing('user', $id) CONTENT $content")
            .bind(("id", user.id.clone()))
            .bind(("content", content))
            .await
            .and_then(surrealdb::Response::check)
            .map_err(|source| {
                if is_identity_clash(&source.to_string()) {
                    AlertsError::conflict(IDENTITY_TAKEN)
                } else {
                    AlertsError::Database { source, context: Some("Creating user".into()) }
                }
            })?;
        Ok(())
    }

    /// # Errors
    /// Fails on database errors.
    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>, AlertsError> {
        let rows: Vec<UserRow> = self
            .db
            .query(format!("SELECT {USER_FIELDS} FROM user WHERE username = $username LIMIT 1"))
            .bind(("username", username.to_owned()))
            .await
            .context("Loading user")?
            .take(0)
            .context("Decoding user")?;
        Ok(rows.into_iter().next().map(User::from))
    }

    /// # Errors
    /// Fails on database errors.
    pub async fn user_by_id(&self, id: &str) -> Result<Option<User>, AlertsError> {
        let rows: Vec<UserRow> = self
            .db
            .query(format!("SELECT {USER_FIELDS} FROM type::thing('user', $id)"))
            .bind(("id", id.to_owned()))
            .await
            .context("Loading user by id")?
            .take(0)
            .context("Decoding user")?;
        Ok(rows.into_iter().next().map(User::from))
    }

    /// Whether either identifier is already registered.
    ///
    /// # Errors
    /// Fails on database errors.
    pub async fn identity_taken(&self, username: &str, email: &str) -> Result<bool, AlertsError> {
        let ids: Vec<String> = self
            .db
            .query(
                "SELECT VALUE record::id(id) FROM user \
                 WHERE username = $username OR email = $email LIMIT 1",
            )
            .bind(("username", username.to_owned()))
            .bind(("email", email.to_owned()))
            .await
            .context("Checking user uniqueness")?
            .take(0)
            .context("Decoding user ids")?;
        Ok(!ids.is_empty())
    }

    /// # Errors
    /// Fails on database errors.
    #[instrument(skip(self))]
    pub async fn set_user_location(
        &self,
        user_id: &str,
        location: Location,
    ) -> Result<(), AlertsError> {
        self.db
            .query(
                "UPDATE type::thing('user', $id) \
                 SET latitude = $latitude, longitude = $longitude RETURN NONE",
            )
            .bind(("id", user_id.to_owned()))
            .bind(("latitude", location.latitude))
            .bind(("longitude", location.longitude))
            .await
            .and_then(surrealdb::Response::check)
            .context("Updating user location")?;
        Ok(())
    }

    /// # Errors
    /// Fails on database errors.
    #[instrument(skip(self, alert), fields(alert_id = %alert.id, owner = %alert.owner))]
    pub async fn insert_alert(&self, alert: &Alert) -> Result<(), AlertsError> {
        self.db
            .query("CREATE type::thing('alert', $id) CONTENT $content")
            .bind(("id", alert.id.clone()))
            .bind(("content", AlertRow::from(alert)))
            .await
            .and_then(surrealdb::Response::check)
            .context("Creating alert")?;
        Ok(())
    }

    /// Alerts owned by `owner`, oldest first.
    ///
    /// # Errors
    /// Fails on database errors.
    pub async fn alerts_for_owner(&self, owner: &str) -> Result<Vec<Alert>, AlertsError> {
        let rows: Vec<AlertRow> = self
            .db
            .query(format!(
                "SELECT {ALERT_FIELDS} FROM alert WHERE owner = $owner ORDER BY created_at ASC"
            ))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Listing alerts")?
            .take(0)
            .context("Decoding alerts")?;
        into_alerts(rows)
    }

    /// # Errors
    /// Fails on database errors.
    pub async fn alert_for_owner(
        &self,
        id: &str,
        owner: &str,
    ) -> Result<Option<Alert>, AlertsError> {
        let rows: Vec<AlertRow> = self
            .db
            .query(format!(
                "SELECT {ALERT_FIELDS} FROM type::thing('alert', $id) WHERE owner = $owner"
            ))
            .bind(("id", id.to_owned()))
            .bind(("owner", owner.to_owned()))
            .await
            .context("Loading alert")?
            .take(0)
            .context("Decoding alert")?;
        Ok(into_alerts(rows)?.into_iter().next())
    }

    /// # Errors
    /// Fails on database errors.
    #[instrument(skip(self))]
    pub async fn set_alert_active(&self, id: &str, is_active: bool) -> Result<(), AlertsError> {
        self.db
            .query("UPDATE type::thing('alert', $id) SET is_active = $is_active RETURN NONE")
            .bind(("id", id.to_owned()))
            .bind(("is_active", is_active))
            .await
            .and_then(surrealdb::Response::check)
            .context("Updating alert")?;
        Ok(())
    }

    /// # Errors
    /// Fails on database errors.
    #[instrument(skip(self))]
    pub async fn delete_alert(&self, id: &str) -> Result<(), AlertsError> {
        self.db
            .query("DELETE type::thing('alert', $id)")
            .bind(("id", id.to_owned()))
            .await
            .and_then(surrealdb::Response::check)
            .context("Deleting alert")?;
        Ok(())
    }

    /// Active alerts that a reading of `aqhi` could trip, before the distance check.
    ///
    /// # Errors
    /// Fails on database errors.
    pub async fn active_alerts_up_to(&self, aqhi: u8) -> Result<Vec<Alert>, AlertsError> {
        let rows: Vec<AlertRow> = self
            .db
            .query(format!(
                "SELECT {ALERT_FIELDS} FROM alert WHERE is_active = true AND threshold <= $aqhi"
            ))
            .bind(("aqhi", aqhi))
            .await
            .context("Loading active alerts")?
            .take(0)
            .context("Decoding active alerts")?;
        into_alerts(rows)
    }
}
