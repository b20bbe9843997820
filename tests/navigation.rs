//! Navigation lifecycle tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use route_runtime::router::{BasePath, Offset};
use route_runtime::{
    BoxError, LifecycleError, RouteNode, RouteState, RouteTree, RouterConfig, RouterOptions,
    RuntimeInstance,
};

mod common;
use common::{instance, recording_guard, Recorder};

#[tokio::test]
async fn test_dashboard_scenario() {
    let instance = instance();
    let router = instance.primary();

    assert!(router.push("/dashboard/42").await.unwrap());

    let route = router.active_route().get().unwrap();
    assert_eq!(route.segments(), vec!["", "dashboard", ":id"]);
    assert_eq!(route.param("id"), Some("42"));
    assert_eq!(route.state(), RouteState::Active);
    assert!(router.pending_route().get().is_none());
    assert_eq!(router.to_string(), "/dashboard/42");
}

#[tokio::test]
async fn test_missing_path_keeps_active_route() {
    let instance = instance();
    let router = instance.primary();

    assert!(router.push("/missing").await.unwrap());
    assert!(router.active_route().get().is_none());
    assert!(router.pending_route().get().is_none());

    router.push("/a").await.unwrap();
    let before = router.active_route().get().unwrap();

    router.push("/missing").await.unwrap();
    let after = router.active_route().get().unwrap();
    assert!(Arc::ptr_eq(&before, &after));

    let rejected = router.last_rejected().unwrap();
    assert_eq!(rejected.state(), RouteState::Rejected);
    assert!(matches!(rejected.error(), Some(LifecycleError::NoMatch(_))));
    assert_eq!(rejected.error().unwrap().status(), 404);
}

#[tokio::test]
async fn test_same_url_is_a_noop() {
    let instance = instance();
    let router = instance.primary();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    router.before_url_change(move |_route| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, BoxError>(true) }
    });

    router.push("/a").await.unwrap();
    let active = router.active_route().get().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    assert!(!router.push("/a").await.unwrap());
    assert!(!router.replace("/a").await.unwrap());
    assert!(!router.push("/a/").await.unwrap());
    assert!(!router.push("//a//").await.unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(router.pending_route().get().is_none());
    assert!(Arc::ptr_eq(&active, &router.active_route().get().unwrap()));
    assert!(router.history().is_empty());
}

#[tokio::test]
async fn test_guard_short_circuit() {
    let recorder = Recorder::new();
    let tree = RouteTree::new(
        RouteNode::root().child(RouteNode::literal("open")).child(
            RouteNode::literal("admin")
                .guard(recording_guard(&recorder, "first", true))
                .guard(recording_guard(&recorder, "second", false))
                .guard(recording_guard(&recorder, "third", true)),
        ),
    )
    .unwrap();
    let instance = RuntimeInstance::new(tree, RouterConfig::default());
    let router = instance.primary();

    router.push("/open").await.unwrap();
    router.push("/admin").await.unwrap();

    assert_eq!(recorder.entries(), vec!["first", "second"]);
    assert_eq!(router.url().as_deref(), Some("/open"));
    let rejected = router.last_rejected().unwrap();
    assert!(matches!(
        rejected.error(),
        Some(LifecycleError::GuardRejected { segment }) if segment == "admin"
    ));
}

#[tokio::test]
async fn test_before_hook_veto_and_removal() {
    let instance = instance();
    let router = instance.primary();

    let id = router.before_url_change(|route| {
        let allow = route.path() != "/b";
        async move { Ok::<_, BoxError>(allow) }
    });

    router.push("/a").await.unwrap();
    router.push("/b").await.unwrap();
    assert_eq!(router.url().as_deref(), Some("/a"));
    assert!(matches!(
        router.last_rejected().unwrap().error(),
        Some(LifecycleError::HookRejected)
    ));

    assert!(router.hooks().before_url_change.remove(id));
    router.push("/b").await.unwrap();
    assert_eq!(router.url().as_deref(), Some("/b"));
    assert!(router.last_rejected().is_none());
}

#[tokio::test]
async fn test_preload_results_and_failure() {
    let instance = instance();
    let router = instance.primary();

    router.push("/posts/hello").await.unwrap();
    let route = router.active_route().get().unwrap();
    let load = route.load();
    assert_eq!(load.status, Some(201));
    assert_eq!(load.maxage, Some(60));
    assert_eq!(load.props["title"], "Posts");
    assert_eq!(load.props["slug"], "hello");
    assert_eq!(route.data().len(), 2);

    router.push("/broken").await.unwrap();
    assert_eq!(router.url().as_deref(), Some("/posts/hello"));
    let err = router.last_rejected().unwrap();
    assert!(matches!(err.error(), Some(LifecycleError::Preload { .. })));
    assert_eq!(err.error().unwrap().status(), 500);
}

#[tokio::test]
async fn test_components_load_before_guards() {
    let recorder = Recorder::new();
    let loads = recorder.clone();
    let guards = recorder.clone();
    let tree = RouteTree::new(
        RouteNode::root().child(
            RouteNode::literal("page")
                .component(move || {
                    loads.record("component");
                    async { Ok::<_, BoxError>(Arc::new("Page") as route_runtime::routing::Component) }
                })
                .guard(move |route| {
                    let loaded = route.components().iter().flatten().count();
                    guards.record(format!("guard sees {loaded}"));
                    async { Ok::<_, BoxError>(true) }
                }),
        ),
    )
    .unwrap();
    let instance = RuntimeInstance::new(tree, RouterConfig::default());
    let router = instance.primary();

    router.push("/page").await.unwrap();
    assert_eq!(recorder.entries(), vec!["component", "guard sees 1"]);

    let route = router.active_route().get().unwrap();
    let components = route.components();
    assert_eq!(components.len(), 2);
    assert!(components[0].is_none());
    let page = components[1].as_ref().unwrap().downcast_ref::<&str>().unwrap();
    assert_eq!(*page, "Page");
}

#[tokio::test]
async fn test_after_hooks_history_and_query() {
    let instance = instance();
    let router = instance.primary();
    let recorder = Recorder::new();

    let seen = recorder.clone();
    router.after_url_change(move |route| seen.record(route.url()));

    router.push("/a").await.unwrap();
    router.push("/b?tab=2&q=x%20y").await.unwrap();

    assert_eq!(recorder.entries(), vec!["/a", "/b?tab=2&q=x%20y"]);
    assert_eq!(router.query()["tab"], "2");
    assert_eq!(router.query()["q"], "x y");
    let history: Vec<String> = router.history().iter().map(|r| r.url().to_string()).collect();
    assert_eq!(history, vec!["/a"]);
}

#[tokio::test]
async fn test_history_is_bounded() {
    let mut config = RouterConfig::default();
    config.router.history_limit = 2;
    let instance = RuntimeInstance::new(common::app_tree(), config);
    let router = instance.primary();

    for url in ["/a", "/b", "/dashboard/1", "/dashboard/2"] {
        router.push(url).await.unwrap();
    }
    let history: Vec<String> = router.history().iter().map(|r| r.url().to_string()).collect();
    assert_eq!(history, vec!["/b", "/dashboard/1"]);
}

#[tokio::test]
async fn test_newest_navigation_wins() {
    let gate = Arc::new(Notify::new());
    let waiting = gate.clone();
    let tree = RouteTree::new(
        RouteNode::root()
            .child(RouteNode::literal("slow").guard(move |_route| {
                let waiting = waiting.clone();
                async move {
                    waiting.notified().await;
                    Ok::<_, BoxError>(true)
                }
            }))
            .child(RouteNode::literal("fast")),
    )
    .unwrap();
    let instance = RuntimeInstance::new(tree, RouterConfig::default());
    let router = instance.primary();

    let slow = tokio::spawn({
        let router = router.clone();
        async move { router.push("/slow").await }
    });
    let mut pending = router.pending_route().subscribe();
    let slow_route = pending
        .wait_for(|route| route.as_ref().map(|r| r.path()) == Some("/slow"))
        .await
        .unwrap()
        .clone()
        .unwrap();

    router.push("/fast").await.unwrap();
    assert_eq!(router.url().as_deref(), Some("/fast"));

    gate.notify_one();
    assert!(slow.await.unwrap().unwrap());
    assert_eq!(router.url().as_deref(), Some("/fast"));
    assert!(matches!(slow_route.error(), Some(LifecycleError::Superseded)));
    // The cancelled attempt does not shadow the active Route.
    assert!(router.last_rejected().is_none());
    assert!(router.pending_route().get().is_none());
}

#[tokio::test]
async fn test_unmatched_url_leaves_inflight_navigation() {
    let gate = Arc::new(Notify::new());
    let waiting = gate.clone();
    let tree = RouteTree::new(RouteNode::root().child(RouteNode::literal("slow").guard(
        move |_route| {
            let waiting = waiting.clone();
            async move {
                waiting.notified().await;
                Ok::<_, BoxError>(true)
            }
        },
    )))
    .unwrap();
    let instance = RuntimeInstance::new(tree, RouterConfig::default());
    let router = instance.primary();

    let slow = tokio::spawn({
        let router = router.clone();
        async move { router.push("/slow").await }
    });
    let mut pending = router.pending_route().subscribe();
    pending
        .wait_for(|route| route.as_ref().map(|r| r.path()) == Some("/slow"))
        .await
        .unwrap();

    assert!(router.push("/missing").await.unwrap());
    assert_eq!(
        router.pending_route().get().map(|r| r.path().to_string()).as_deref(),
        Some("/slow")
    );
    assert!(matches!(
        router.last_rejected().unwrap().error(),
        Some(LifecycleError::NoMatch(_))
    ));

    gate.notify_one();
    assert!(slow.await.unwrap().unwrap());
    assert_eq!(router.url().as_deref(), Some("/slow"));
    assert!(router.last_rejected().is_none());
    assert!(router.pending_route().get().is_none());
}

#[tokio::test]
async fn test_url_normalization_and_transforms() {
    let instance = instance();
    let router = instance
        .create_router(RouterOptions::named("app").url_transform(Arc::new(BasePath::new("/app"))))
        .unwrap();

    router.push("https://example.com/app/a?x=1").await.unwrap();
    assert_eq!(router.url().as_deref(), Some("/a?x=1"));
    assert_eq!(router.external_url().as_deref(), Some("/app/a?x=1"));
    assert_eq!(router.query()["x"], "1");

    router.push("").await.unwrap();
    assert_eq!(router.active_route().get().unwrap().segments(), vec!["", "home"]);

    assert!(router.push("not a url").await.is_err());
}

#[tokio::test]
async fn test_offset_scopes_resolution() {
    let instance = instance();
    let nested = instance
        .create_router(RouterOptions::named("nested").offset(Offset::Path("/dashboard".into())))
        .unwrap();

    nested.push("/7").await.unwrap();
    let route = nested.active_route().get().unwrap();
    assert_eq!(route.segments(), vec!["dashboard", ":id"]);
    assert_eq!(route.param("id"), Some("7"));

    nested.set_offset(None);
    nested.push("/a").await.unwrap();
    assert_eq!(nested.url().as_deref(), Some("/a"));
}

#[tokio::test]
async fn test_destroy_fires_hooks_once() {
    let instance = instance();
    let side = instance.router_or_create("side");
    let other = instance.router_or_create("other");
    let recorder = Recorder::new();

    let seen = recorder.clone();
    side.on_destroy(move |router| seen.record(router.name()));

    side.destroy();
    side.destroy();
    assert_eq!(recorder.entries(), vec!["side"]);
    assert!(instance.router("side").is_none());
    assert!(other.push("/a").await.unwrap());
}
