use dayqhi_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn second_init_reports_subscriber_error() {
    let _logger = Logger::builder()
        .name("dayqhi-first")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("dayqhi-second")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }));
}
