use dayqhi::PlatformError;
use dayqhi::domain::config::ApiConfig;
use dayqhi::features::{alerts::Alerts, shell::Shell};
use dayqhi::kernel::prelude::{ApiState, Database, EventBus};

async fn database() -> Database {
    Database::builder()
        .url("mem://")
        .session("test", "facade")
        .migrations(dayqhi::migrations())
        .init()
        .await
        .unwrap()
}

#[test]
fn every_migration_is_keyed_by_slice() {
    let keys: Vec<_> = dayqhi::migrations().iter().map(|m| m.key()).collect();
    assert_eq!(keys, ["alerts:0001"]);
}

#[tokio::test]
async fn init_registers_every_slice() {
    let config = ApiConfig::default();
    let database = database().await;
    let events = EventBus::new();

    let slices = dayqhi::init(&config, &database, &events).unwrap();
    assert_eq!(slices.len(), 2);

    let state = ApiState::builder()
        .config(config)
        .db(database)
        .events(events)
        .register_slices(slices)
        .build()
        .unwrap();

    assert!(state.get_slice::<Shell>().is_some());
    assert!(state.get_slice::<Alerts>().is_some());
}

#[tokio::test]
async fn blank_site_title_stops_bootstrap() {
    let mut config = ApiConfig::default();
    config.site.title = String::new();

    let err = dayqhi::init(&config, &database().await, &EventBus::new()).unwrap_err();
    assert!(matches!(err, PlatformError::Shell { .. }));
}

#[test]
fn api_document_covers_system_and_alert_routes() {
    let (_, document) = dayqhi::api_router().split_for_parts();
    let paths: Vec<_> = document.paths.paths.keys().cloned().collect();

    let expected = [
        "/health",
        "/api/hello",
        "/api/users",
        "/api/users/{username}/alerts/{id}",
        "/api/readings",
    ];
    for expected in expected {
        assert!(paths.iter().any(|p| p == expected), "missing {expected}");
    }
}
