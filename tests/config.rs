use realm_common::ConfigError;
use realm_services::observability::init_observability;
use realm_services::{CommitMode, Error, RegistryConfig, Server};
use serial_test::serial;
use std::fs;

#[test]
fn test_server_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.toml");
    fs::write(
        &path,
        r#"
name = "app"

[registration]
commit_mode = "sequential"
warn_late_registration = false
"#,
    )
    .unwrap();

    let server = Server::from_config_file(&path).unwrap();
    assert_eq!(server.realm_path(), "app");
    assert_eq!(
        server.config().registration.commit_mode,
        CommitMode::Sequential
    );
    assert!(!server.config().registration.warn_late_registration);
}

#[test]
fn test_invalid_config_file_surfaces_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.toml");
    fs::write(
        &path,
        r#"
[observability.log]
output = "syslog"
"#,
    )
    .unwrap();

    let err = Server::from_config_file(&path).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Invalid { .. })));

    let err = Server::from_config_file(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::FileNotFound { .. })));
}

#[test]
fn test_unknown_commit_mode_is_rejected() {
    let err = RegistryConfig::from_toml(
        r#"
[registration]
commit_mode = "eventually"
"#,
    );
    assert!(err.is_err());
}

#[test]
#[serial]
fn test_console_logging_is_idempotent() {
    let config = RegistryConfig::default();
    let first = init_observability(&config).unwrap();
    let second = init_observability(&config).unwrap();
    assert!(!first.is_file_backed());
    assert!(!second.is_file_backed());
}
