use realm_services::observability::init_observability;
use realm_services::{RegistryConfig, Server, ServiceDescriptor};
use serde_json::Value;
use std::fs;

// Only test of this binary: the global subscriber it installs is the one
// every event goes through.
#[test]
fn test_file_logging_writes_registrations() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let mut config = RegistryConfig::default();
    config.observability.filter_level = "info".to_string();
    config.observability.log.output = "file".to_string();
    config.observability.log.path = log_dir.to_string_lossy().into_owned();

    // SAFETY: single-threaded at this point, no other test in this binary
    unsafe { std::env::remove_var("RUST_LOG") };

    let guard = init_observability(&config).unwrap();
    assert!(guard.is_file_backed());
    assert!(log_dir.is_dir());

    let server = Server::new(config);
    server
        .register_service_methods(
            ServiceDescriptor::new("sqs").method("init", |_, _| async { Ok(Value::Null) }),
        )
        .unwrap();

    // dropping the guard flushes the background writer
    drop(guard);

    let log = fs::read_to_string(log_dir.join("realm-services.log")).unwrap();
    assert!(log.contains("Registered service scope sqs"));
}
