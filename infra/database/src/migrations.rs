use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

const BOOTSTRAP: &str = "
    DEFINE TABLE IF NOT EXISTS migration SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS slice ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS version ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS checksum ON migration TYPE string;
    DEFINE FIELD IF NOT EXISTS applied_at ON migration TYPE datetime DEFAULT time::now();
    DEFINE INDEX IF NOT EXISTS migration_key ON migration FIELDS slice, version UNIQUE;
";

/// A schema script owned by a feature slice.
///
/// Scripts are identified by `(slice, version)` and fingerprinted with SHA-256; editing a
/// script after it has been applied is reported as [`DatabaseError::Migration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    /// Lowercase hex SHA-256 of the script.
    #[must_use]
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.script.as_bytes()))
    }

    /// `slice:version`, as recorded in [`MigrationReport`].
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }
}

/// Outcome of a migration run, as `slice:version` keys.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AppliedMigration {
    slice: String,
    version: String,
    checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(
        &self,
        migrations: &[Migration],
    ) -> Result<MigrationReport, DatabaseError> {
        self.db
            .query(BOOTSTRAP)
            .await
            .context("Defining migration table")?
            .check()
            .context("Defining migration table")?;

        let applied = self.applied().await?;
        let mut report = MigrationReport::default();

        for migration in migrations {
            let checksum = migration.checksum();
            if let Some(existing) = applied.get(&migration.key()) {
                ensure_checksum_match(migration, existing, &checksum)?;
                report.skipped.push(migration.key());
                continue;
            }

            self.apply(migration, checksum).await?;
            report.applied.push(migration.key());
        }

        Ok(report)
    }

    async fn applied(&self) -> Result<FxHashMap<String, String>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries
            .into_iter()
            .map(|entry| (format!("{}:{}", entry.slice, entry.version), entry.checksum))
            .collect())
    }

    async fn apply(&self, migration: &Migration, checksum: String) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{ slice: $slice, version: $version, checksum: $checksum }};
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(query)
            .bind(("slice", migration.slice))
            .bind(("version", migration.version))
            .bind(("checksum", checksum))
            .await
            .and_then(surrealdb::Response::check)
            .context(format!("Applying migration {}", migration.key()))?;

        Ok(())
    }
}

fn ensure_checksum_match(
    migration: &Migration,
    existing: &str,
    checksum: &str,
) -> Result<(), DatabaseError> {
    if existing != checksum {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (recorded {existing}, found {checksum})",
                migration.key()
            )
            .into(),
            context: Some("Migration already applied with different contents".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_sha256_hex() {
        let migration = Migration::new("test", "0001", "");
        assert_eq!(
            migration.checksum(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn changed_script_changes_checksum() {
        let a = Migration::new("alerts", "0001", "DEFINE TABLE a;");
        let b = Migration::new("alerts", "0001", "DEFINE TABLE b;");
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn mismatch_is_reported() {
        let migration = Migration::new("alerts", "0001", "DEFINE TABLE a;");
        let err = ensure_checksum_match(&migration, "deadbeef", &migration.checksum()).unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
        assert!(err.to_string().contains("alerts:0001"));
    }
}
