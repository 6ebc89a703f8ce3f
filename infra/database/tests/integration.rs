use dayqhi_database::{Database, DatabaseError, Migration};
use serde::Deserialize;

const NOTES_V1: Migration =
    Migration::new("notes", "0001", "DEFINE TABLE IF NOT EXISTS note SCHEMALESS;");
const NOTES_V2: Migration =
    Migration::new("notes", "0002", "CREATE note:first CONTENT { body: 'hello' };");

#[derive(Debug, Deserialize)]
struct Note {
    body: String,
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .init()
        .await
        .expect("connect to mem://");

    db.health().await.expect("health check");
    assert_eq!(db.namespace(), "test_ns");
    assert_eq!(db.database(), "test_db");
    assert!(db.migration_report().applied.is_empty());
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn migrations_apply_in_order() {
    let db = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .migrations([NOTES_V1, NOTES_V2])
        .init()
        .await
        .expect("migrate");

    assert_eq!(db.migration_report().applied, vec!["notes:0001", "notes:0002"]);

    let notes: Vec<Note> =
        db.query("SELECT body FROM note").await.unwrap().take(0).expect("notes");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].body, "hello");

    let recorded: Vec<String> = db
        .query("SELECT VALUE checksum FROM migration WHERE version = '0001'")
        .await
        .unwrap()
        .take(0)
        .unwrap();
    assert_eq!(recorded, vec![NOTES_V1.checksum()]);
}

#[tokio::test]
async fn failing_migration_is_not_recorded() {
    let broken = Migration::new("broken", "0001", "THROW 'nope';");
    let err = Database::builder()
        .url("mem://")
        .session("test_ns", "test_db")
        .migrations([broken])
        .init()
        .await
        .unwrap_err();

    assert!(matches!(err, DatabaseError::Surreal { .. }));
    assert!(err.to_string().contains("broken:0001"));
}
