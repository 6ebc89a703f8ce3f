use dayqhi_kernel::config::load_config;
use dayqhi_kernel::domain::config::ApiConfig;
use serial_test::serial;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn file_values_fill_the_model() {
    let file = write_config(
        r#"
        [server]
        port = 8080

        [site]
        title = "DayQHI Staging"
        "#,
    );

    let cfg: ApiConfig = load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.site.title, "DayQHI Staging");
    assert_eq!(cfg.database.namespace, "dayqhi");
}

#[test]
#[serial]
fn unknown_sections_are_ignored_and_types_are_checked() {
    let file = write_config("[telemetry]\nendpoint = \"x\"\n");
    let cfg: ApiConfig = load_config(Some(file.path())).unwrap();
    assert_eq!(cfg.server.port, 3000);

    let bad = write_config("[server]\nport = \"not-a-port\"\n");
    assert!(load_config::<ApiConfig>(Some(bad.path())).is_err());
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let cfg: Result<ApiConfig, _> = load_config(Some("/definitely/not/here.toml"));
    assert!(cfg.is_err());
}
