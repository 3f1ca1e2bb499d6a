#![allow(missing_docs)]
#![cfg(feature = "tracing")]

use named_di::{Container, ContainerConfig, error::Error};
use tracing_subscriber::{EnvFilter, fmt};

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("named_di=trace"))
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn it_resolves_with_tracing_enabled() {
    init_tracing();

    let container = Container::new();
    let n = container.register("n", || 1);
    let m = container.register_async("m", || async { 2 });

    let resolved = container.resolve_async([&n, &m]).await.unwrap();
    container.resolve([&n]).unwrap();
    container.clear_instance("n");
    container.clear_all_instances();

    assert_eq!(*resolved.get::<i32>("n").unwrap(), 1);
    assert_eq!(*resolved.get::<i32>("m").unwrap(), 2);
}

#[tokio::test]
async fn it_evicts_failed_build_with_tracing_enabled() {
    init_tracing();

    let container = Container::with_config(ContainerConfig::new().with_failure_eviction());
    let failing = container.register_async("failing", |_: Container| async {
        Err::<i32, _>(Error::other("boom"))
    });

    assert!(container.resolve_async([&failing]).await.is_err());
    assert!(!container.is_cached("failing"));
}
