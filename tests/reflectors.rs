//! URL reflector tests.

use std::sync::Arc;

use route_runtime::reflector::{
    History, MemoryHistory, MemoryStorage, ReflectorKind, Storage, UrlReflector,
};
use route_runtime::router::BasePath;
use route_runtime::{RouterConfig, RouterOptions, RuntimeInstance};

mod common;
use common::{app_tree, eventually, instance, Recorder, RecordingReflector};

#[tokio::test]
async fn test_swap_uninstalls_before_installing() {
    let instance = instance();
    let router = instance.primary();
    let recorder = Recorder::new();

    let log = recorder.clone();
    router.set_reflector(move |_| {
        Box::new(RecordingReflector {
            label: "one",
            recorder: log,
        })
    });
    let log = recorder.clone();
    router.set_reflector(move |_| {
        Box::new(RecordingReflector {
            label: "two",
            recorder: log,
        })
    });

    assert_eq!(
        recorder.entries(),
        vec!["install:one", "uninstall:one", "install:two"]
    );

    router.push("/a").await.unwrap();
    eventually(|| recorder.count("reflect:two") == 1).await;
    assert_eq!(recorder.count("reflect:one"), 0);
    assert_eq!(recorder.count("install:two"), 1);
}

#[tokio::test]
async fn test_reflect_runs_after_hooks() {
    let instance = instance();
    let router = instance.primary();
    let recorder = Recorder::new();

    let log = recorder.clone();
    router.set_reflector(move |_| {
        Box::new(RecordingReflector {
            label: "r",
            recorder: log,
        })
    });
    let log = recorder.clone();
    router.after_url_change(move |_route| log.record("after"));

    router.push("/a").await.unwrap();
    assert_eq!(recorder.entries(), vec!["install:r", "after"]);
    eventually(|| recorder.count("reflect:r") == 1).await;
}

fn address_instance(history: &Arc<MemoryHistory>) -> Arc<RuntimeInstance> {
    let mut config = RouterConfig::default();
    config.router.default_reflector = ReflectorKind::Address;
    RuntimeInstance::builder(app_tree())
        .config(config)
        .history(history.clone())
        .build()
}

#[tokio::test]
async fn test_address_reflector_round_trip() {
    let history = Arc::new(MemoryHistory::new("/a;side=/b"));
    let instance = address_instance(&history);

    let primary = instance.primary();
    assert_eq!(primary.reflector().kind(), Some(ReflectorKind::Address));
    eventually(|| primary.url().as_deref() == Some("/a")).await;
    // The side segment waits for its router.
    assert_eq!(history.location(), "/a;side=/b");

    let side = instance.router_or_create("side");
    eventually(|| side.url().as_deref() == Some("/b")).await;

    primary.push("/dashboard/42").await.unwrap();
    eventually(|| history.location() == "/dashboard/42;side=/b").await;
    assert_eq!(history.len(), 2);

    side.replace("/a").await.unwrap();
    eventually(|| history.location() == "/dashboard/42;side=/a").await;
    assert_eq!(history.len(), 2);

    assert!(history.back());
    eventually(|| primary.url().as_deref() == Some("/a")).await;
    eventually(|| side.url().as_deref() == Some("/b")).await;
    assert_eq!(primary.active_route().get().unwrap().mode().to_string(), "pop");
    // Pop navigations never write back.
    assert_eq!(history.location(), "/a;side=/b");
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_address_reflector_writes_external_url() {
    let history = Arc::new(MemoryHistory::new("/"));
    let instance = address_instance(&history);
    let router = instance
        .create_router(RouterOptions::default().url_transform(Arc::new(BasePath::new("/app"))))
        .unwrap();
    eventually(|| history.location() == "/app").await;

    router.push("/app/b").await.unwrap();
    assert_eq!(router.url().as_deref(), Some("/b"));
    eventually(|| history.location() == "/app/b").await;
}

#[tokio::test]
async fn test_storage_reflector_restores_and_writes() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set("__router-side", "/b").unwrap();
    let instance = RuntimeInstance::builder(app_tree())
        .storage(storage.clone())
        .build();

    let side = instance
        .create_router(RouterOptions::named("side").reflector(ReflectorKind::Storage))
        .unwrap();
    eventually(|| side.url().as_deref() == Some("/b")).await;

    side.push("/dashboard/3").await.unwrap();
    eventually(|| storage.get("__router-side").as_deref() == Some("/dashboard/3")).await;

    // Routers with another reflector leave storage alone.
    let primary = instance.primary();
    primary.push("/a").await.unwrap();
    tokio::task::yield_now().await;
    assert!(storage.get("__router-").is_none());
}

#[tokio::test]
async fn test_swapping_to_internal_stops_listening() {
    let history = Arc::new(MemoryHistory::new("/a"));
    let instance = address_instance(&history);
    let primary = instance.primary();
    eventually(|| primary.url().as_deref() == Some("/a")).await;

    primary.push("/b").await.unwrap();
    eventually(|| history.location() == "/b").await;

    primary.set_reflector_kind(ReflectorKind::Internal);
    assert!(history.back());
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(primary.url().as_deref(), Some("/b"));
}
