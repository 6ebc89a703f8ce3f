use dayqhi_alerts::{
    AlertMethod, AlertRepository, AlertService, AlertTriggered, AlertsError, Geocoder, Location,
    NewAlert, Notifier, Reading, RegisterUser,
};
use dayqhi_database::Database;
use dayqhi_domain::config::GeocoderConfig;
use dayqhi_event_bus::{EventBus, EventReceiverExt};
use serde_json::json;
use std::time::Duration;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EDMONTON: Location = Location { latitude: 53.5461, longitude: -113.4937 };
const ST_ALBERT: Location = Location { latitude: 53.6305, longitude: -113.6256 };
const CALGARY: Location = Location { latitude: 51.0447, longitude: -114.0719 };

struct Fixture {
    service: AlertService,
    events: EventBus,
    dispatched: JoinHandle<usize>,
    _geocoder: MockServer,
}

async fn fixture() -> Fixture {
    fixture_with_queue(64).await
}

async fn fixture_with_queue(capacity: usize) -> Fixture {
    let geocoder = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "lat": "53.5461", "lon": "-113.4937" }])),
        )
        .mount(&geocoder)
        .await;

    let database = Database::builder()
        .url("mem://")
        .session("test", "alerts")
        .migrations(dayqhi_alerts::migrations())
        .init()
        .await
        .unwrap();
    let client = Geocoder::new(&GeocoderConfig { url: geocoder.uri(), ..Default::default() })
        .unwrap();
    let events = EventBus::new();
    let (notifier, dispatched) = Notifier::spawn(capacity).unwrap();

    Fixture {
        service: AlertService::new(
            AlertRepository::new(database),
            client,
            events.clone(),
            notifier,
            25.0,
        ),
        events,
        dispatched,
        _geocoder: geocoder,
    }
}

fn registration(username: &str, email: &str) -> RegisterUser {
    RegisterUser {
        username: username.to_owned(),
        password: "correct horse".to_owned(),
        email: email.to_owned(),
        location: Some(EDMONTON),
        address: None,
    }
}

fn alert(name: &str, threshold: u8) -> NewAlert {
    NewAlert {
        alert_name: name.to_owned(),
        threshold,
        alert_method: None,
        mobile_number: None,
        location: None,
    }
}

#[tokio::test]
async fn registered_user_can_be_loaded() {
    let fx = fixture().await;

    let view = fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();
    assert_eq!(view.id.len(), 12);

    let user = fx.service.get_user("ada").await.unwrap();
    assert_eq!(user.id, view.id);
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.location, EDMONTON);
}

#[tokio::test]
async fn address_is_geocoded_when_location_is_missing() {
    let fx = fixture().await;
    let request = RegisterUser {
        location: None,
        address: Some("10065 Jasper Ave".to_owned()),
        ..registration("ada", "ada@example.com")
    };

    let view = fx.service.register_user(request).await.unwrap();
    assert_eq!(view.location, EDMONTON);
}

#[tokio::test]
async fn registration_without_location_or_address_is_invalid() {
    let fx = fixture().await;
    let request = RegisterUser { location: None, ..registration("ada", "ada@example.com") };

    let err = fx.service.register_user(request).await.unwrap_err();
    assert!(matches!(err, AlertsError::Validation { .. }));
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
    let fx = fixture().await;
    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();

    let same_name = fx.service.register_user(registration("ada", "other@example.com")).await;
    let same_email = fx.service.register_user(registration("grace", "ada@example.com")).await;

    assert!(matches!(same_name, Err(AlertsError::Conflict { .. })));
    assert!(matches!(same_email, Err(AlertsError::Conflict { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_registrations_yield_one_user_and_one_conflict() {
    let fx = fixture().await;

    for round in 0..10 {
        let username = format!("racer{round}");
        let email = format!("racer{round}@example.com");
        let (first, second) = tokio::join!(
            fx.service.register_user(registration(&username, &email)),
            fx.service.register_user(registration(&username, &email)),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
        assert!(
            outcomes.iter().any(|outcome| matches!(outcome, Err(AlertsError::Conflict { .. }))),
            "round {round}: {outcomes:?}"
        );
    }
}

#[tokio::test]
async fn malformed_email_is_invalid() {
    let fx = fixture().await;
    let err = fx.service.register_user(registration("ada", "ada.example.com")).await.unwrap_err();
    assert!(matches!(err, AlertsError::Validation { .. }));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let fx = fixture().await;
    let err = fx.service.get_user("nobody").await.unwrap_err();
    assert!(matches!(err, AlertsError::NotFound { .. }));
    assert_eq!(err.to_string(), "User not found");
}

#[tokio::test]
async fn location_updates_are_persisted() {
    let fx = fixture().await;
    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();

    fx.service.update_location("ada", CALGARY).await.unwrap();
    assert_eq!(fx.service.get_user("ada").await.unwrap().location, CALGARY);

    let resolved = fx.service.geocode_location("ada", "Downtown Edmonton").await.unwrap();
    assert_eq!(resolved, EDMONTON);
    assert_eq!(fx.service.get_user("ada").await.unwrap().location, EDMONTON);
}

#[tokio::test]
async fn alerts_default_to_owner_location_and_list_oldest_first() {
    let fx = fixture().await;
    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();

    let first = fx.service.create_alert("ada", alert("Commute", 6)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = fx
        .service
        .create_alert("ada", NewAlert { location: Some(CALGARY), ..alert("Cabin", 4) })
        .await
        .unwrap();

    assert!(first.is_active);
    assert_eq!(first.location, EDMONTON);
    assert_eq!(second.location, CALGARY);

    let names: Vec<_> = fx
        .service
        .list_alerts("ada")
        .await
        .unwrap()
        .into_iter()
        .map(|alert| alert.alert_name)
        .collect();
    assert_eq!(names, ["Commute", "Cabin"]);
}

#[tokio::test]
async fn alerts_are_only_reachable_by_their_owner() {
    let fx = fixture().await;
    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();
    fx.service.register_user(registration("grace", "grace@example.com")).await.unwrap();
    let created = fx.service.create_alert("ada", alert("Commute", 6)).await.unwrap();

    let foreign = fx.service.set_alert_active("grace", &created.id, false).await;
    assert!(matches!(foreign, Err(AlertsError::NotFound { .. })));

    let updated = fx.service.set_alert_active("ada", &created.id, false).await.unwrap();
    assert!(!updated.is_active);
    assert!(!fx.service.list_alerts("ada").await.unwrap()[0].is_active);

    let foreign = fx.service.delete_alert("grace", &created.id).await;
    assert!(matches!(foreign, Err(AlertsError::NotFound { .. })));

    fx.service.delete_alert("ada", &created.id).await.unwrap();
    assert!(fx.service.list_alerts("ada").await.unwrap().is_empty());

    let gone = fx.service.delete_alert("ada", &created.id).await;
    assert!(matches!(gone, Err(AlertsError::NotFound { .. })));
}

#[tokio::test]
async fn prefixed_alert_ids_are_accepted() {
    let fx = fixture().await;
    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();
    let created = fx.service.create_alert("ada", alert("Commute", 6)).await.unwrap();

    let updated =
        fx.service.set_alert_active("ada", &format!("alert:{}", created.id), false).await.unwrap();
    assert_eq!(updated.id, created.id);

    let wrong_table = fx.service.delete_alert("ada", &format!("user:{}", created.id)).await;
    assert!(matches!(wrong_table, Err(AlertsError::Resource { .. })));
}

#[tokio::test]
async fn sms_alert_requires_mobile_number() {
    let fx = fixture().await;
    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();

    let request = NewAlert { alert_method: Some(AlertMethod::Sms), ..alert("Text me", 5) };
    let err = fx.service.create_alert("ada", request).await.unwrap_err();
    assert!(matches!(err, AlertsError::Validation { .. }));
}

#[tokio::test]
async fn readings_trigger_nearby_active_alerts_at_or_above_threshold() {
    let fx = fixture().await;
    let mut triggered = fx.events.subscribe::<AlertTriggered>().unwrap();

    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();
    let commute = fx.service.create_alert("ada", alert("Commute", 6)).await.unwrap();
    fx.service.create_alert("ada", alert("Only when bad", 9)).await.unwrap();
    fx.service
        .create_alert("ada", NewAlert { location: Some(CALGARY), ..alert("Cabin", 2) })
        .await
        .unwrap();
    let paused = fx.service.create_alert("ada", alert("Paused", 1)).await.unwrap();
    fx.service.set_alert_active("ada", &paused.id, false).await.unwrap();

    let report =
        fx.service.evaluate_reading(Reading { location: ST_ALBERT, aqhi: 7 }).await.unwrap();

    assert_eq!(report.aqhi, 7);
    assert_eq!(report.triggered.len(), 1);
    assert_eq!(report.triggered[0].id, commute.id);

    let next = EventReceiverExt::recv(&mut triggered);
    let event = tokio::time::timeout(Duration::from_secs(1), next).await.unwrap().unwrap();
    assert_eq!(event.alert.id, commute.id);
    assert_eq!(event.aqhi, 7);
    assert_eq!(event.email, "ada@example.com");
}

#[tokio::test]
async fn low_readings_trigger_nothing() {
    let fx = fixture().await;
    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();
    fx.service.create_alert("ada", alert("Commute", 6)).await.unwrap();

    let report =
        fx.service.evaluate_reading(Reading { location: EDMONTON, aqhi: 5 }).await.unwrap();
    assert!(report.triggered.is_empty());
}

#[tokio::test]
async fn out_of_scale_reading_is_invalid() {
    let fx = fixture().await;
    let err = fx
        .service
        .evaluate_reading(Reading { location: EDMONTON, aqhi: 12 })
        .await
        .unwrap_err();
    assert!(matches!(err, AlertsError::Validation { .. }));
}

#[tokio::test]
async fn readings_tripping_more_alerts_than_the_queue_holds_notify_every_one() {
    let fx = fixture_with_queue(2).await;
    fx.service.register_user(registration("ada", "ada@example.com")).await.unwrap();
    for n in 0..12 {
        fx.service.create_alert("ada", alert(&format!("Alert {n}"), 3)).await.unwrap();
    }

    let report =
        fx.service.evaluate_reading(Reading { location: EDMONTON, aqhi: 10 }).await.unwrap();
    assert_eq!(report.triggered.len(), 12);

    let Fixture { service, dispatched, .. } = fx;
    drop(service);
    let processed =
        tokio::time::timeout(Duration::from_secs(5), dispatched).await.unwrap().unwrap();
    assert_eq!(processed, 12);
}
