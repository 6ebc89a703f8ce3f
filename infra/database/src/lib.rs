//! # Database Infrastructure
//!
//! Opens the [SurrealDB](https://surrealdb.com) connection shared by every slice and
//! applies their schema migrations.
//!
//! - **Engine Agnostic**: `mem://`, `ws://` and `http://` through the `any` engine
//!   (`rocksdb://` behind the `storage-rocksdb` feature).
//! - **Resilient Connectivity**: health checks are retried with exponential backoff.
//! - **Migrations**: scripts run once per `(slice, version)` inside a transaction and are
//!   guarded by a SHA-256 checksum.
//!
//! ## Example
//!
//! ```rust
//! use dayqhi_database::{Database, DatabaseError, Migration};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder()
//!         .url("mem://")
//!         .session("dayqhi", "aqhi")
//!         .migrations([Migration::new("demo", "0001", "DEFINE TABLE demo SCHEMALESS;")])
//!         .init()
//!         .await?;
//!
//!     db.health().await.expect("in-memory engine is healthy");
//!     Ok(())
//! }
//! ```

mod error;
mod migrations;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use migrations::{Migration, MigrationReport};

use migrations::MigrationRunner;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{debug, info, instrument, warn};

const HEALTH_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
    report: MigrationReport,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// Cloneable handle to the `SurrealDB` session. Derefs to [`Surreal<Any>`].
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.inner.db
    }

    /// Migrations applied or skipped while this handle was initialised.
    #[must_use]
    pub fn migration_report(&self) -> &MigrationReport {
        &self.inner.report
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// Fluent builder for a `SurrealDB` connection.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
    migrations: Vec<Migration>,
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Signs in as a root user after connecting.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Queues migrations; they run in the given order during [`DatabaseBuilder::init`].
    pub fn migrations(mut self, migrations: impl IntoIterator<Item = Migration>) -> Self {
        self.migrations.extend(migrations);
        self
    }

    /// Connects, waits for the engine, authenticates, selects the session and migrates.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if the URL, namespace or database is missing.
    /// * [`DatabaseError::Connection`] if the engine fails to start or stays unhealthy.
    /// * [`DatabaseError::Auth`] if the root credentials are rejected.
    /// * [`DatabaseError::Migration`] or [`DatabaseError::Surreal`] if a migration fails.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = required(self.url, "URL is required")?;
        let ns = required(self.ns, "Namespace is required")?;
        let db = required(self.db, "Database is required")?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        wait_until_healthy(&instance, &url).await?;

        if let Some((username, password)) = &self.auth {
            let credentials = Root { username: username.as_str(), password: password.as_str() };
            instance.signin(credentials).await.map_err(|e| DatabaseError::Auth {
                message: e.to_string().into(),
                context: Some(url.clone().into()),
            })?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "SurrealDB connection established");

        let report = MigrationRunner::new(&instance).run(&self.migrations).await?;
        for key in &report.skipped {
            debug!(migration = %key, "Migration already applied");
        }
        for key in &report.applied {
            info!(migration = %key, "Applied migration");
        }

        Ok(Database { inner: Arc::new(DatabaseInner { instance, ns, db, report }) })
    }
}

fn required(value: Option<String>, message: &'static str) -> Result<String, DatabaseError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(DatabaseError::Validation { message: message.into(), context: None })
}

async fn wait_until_healthy(instance: &Surreal<Any>, url: &str) -> Result<(), DatabaseError> {
    let mut delay = INITIAL_BACKOFF;
    for attempt in 1..=HEALTH_ATTEMPTS {
        if instance.health().await.is_ok() {
            return Ok(());
        }
        if attempt < HEALTH_ATTEMPTS {
            warn!(attempt, ?delay, "Database not ready, retrying");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }

    Err(DatabaseError::Connection {
        message: "Unhealthy after retries".into(),
        context: Some(url.to_owned().into()),
    })
}
