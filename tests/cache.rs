use realm_services::service::{CacheOptions, ServiceEntry, service_fn};
use realm_services::{Error, RegistryConfig, Server, ServiceDescriptor};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn counted_sqs(calls: Arc<AtomicUsize>, cache: CacheOptions) -> ServiceDescriptor {
    let init = service_fn(move |_, args| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(args)
        }
    });
    ServiceDescriptor::new("sqs").service(ServiceEntry::new("init", init).with_cache(cache))
}

// Tokio time is paused so the 2ms generate timeout only measures the
// method itself; the expiry window is real time, hence the blocking sleep.
#[tokio::test(start_paused = true)]
async fn test_cached_method_runs_once_per_window() {
    let calls = Arc::new(AtomicUsize::new(0));
    let server = Server::new(RegistryConfig::default());
    server
        .register_service_methods(counted_sqs(
            calls.clone(),
            CacheOptions::new().expires_in(100).generate_timeout(2),
        ))
        .unwrap();

    let init = server.method("sqs.init").unwrap();
    init.call(json!(true)).await.unwrap();
    init.call(json!(true)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    std::thread::sleep(Duration::from_millis(150));
    init.call(json!(true)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_service_map_holds_memoized_wrapper() {
    let calls = Arc::new(AtomicUsize::new(0));
    let server = Server::new(RegistryConfig::default());
    server
        .register_service_methods(counted_sqs(
            calls.clone(),
            CacheOptions::new().expires_in(60_000),
        ))
        .unwrap();

    let from_map = server.services(true).get("sqs", "init").cloned().unwrap();
    let from_table = server.method("sqs.init").unwrap();
    assert!(from_map.same_callable(&from_table));

    from_map.call(json!({ "a": 1 })).await.unwrap();
    from_table.call(json!({ "a": 1 })).await.unwrap();
    from_map.call(json!({ "a": 2 })).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_uncached_services_stay_out_of_method_table() {
    let server = Server::new(RegistryConfig::default());
    server
        .register_service_methods(
            ServiceDescriptor::new("plain").method("one", |_, _| async { Ok(json!(null)) }),
        )
        .unwrap();

    assert!(server.method("plain.one").is_none());
    assert!(server.method_keys().is_empty());
}

#[test]
fn test_method_key_collision_is_reported() {
    let server = Server::new(RegistryConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    server
        .register_service_methods(counted_sqs(calls.clone(), CacheOptions::new()))
        .unwrap();

    // same scope is caught first
    let err = server
        .register_service_methods(counted_sqs(calls, CacheOptions::new()))
        .unwrap_err();
    assert!(matches!(err, Error::ScopeCollision { .. }));
    assert_eq!(server.method_keys(), vec!["sqs.init"]);
}

#[test]
fn test_oversized_expiry_is_a_validation_error() {
    let server = Server::new(RegistryConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let err = server
        .register_service_methods(counted_sqs(
            calls,
            CacheOptions::new().insert("expiresIn", json!(u64::MAX)),
        ))
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().contains("\"expiresIn\""));
    assert!(server.method_keys().is_empty());
}

#[test]
fn test_colliding_method_keys_in_one_call_leave_no_trace() {
    let server = Server::new(RegistryConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let cached = |scope: &str, name: &str| {
        let calls = calls.clone();
        let method = service_fn(move |_, args| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(args)
            }
        });
        ServiceDescriptor::new(scope)
            .service(ServiceEntry::new(name, method).with_cache(CacheOptions::new()))
    };

    // "a.b" + "c" and "a" + "b.c" both address the method "a.b.c"
    let err = server
        .register_service_methods(vec![cached("a.b", "c"), cached("a", "b.c")])
        .unwrap_err();
    assert!(matches!(err, Error::MethodExists { ref key } if key == "a.b.c"));
    assert!(server.services(true).is_empty());
    assert!(server.method_keys().is_empty());

    server.register_service_methods(cached("a.b", "c")).unwrap();
    assert_eq!(server.method_keys(), vec!["a.b.c"]);
}
