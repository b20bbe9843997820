//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use route_runtime::reflector::{ReflectorKind, UrlReflector};
use route_runtime::{BoxError, LoadResult, RouteNode, RouteTree, RouterConfig, RuntimeInstance};

/// Ordered log shared between a test and the callbacks it installs.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }
}

/// A guard that records its label and answers `allow`.
pub fn recording_guard(
    recorder: &Recorder,
    label: &'static str,
    allow: bool,
) -> impl Fn(Arc<route_runtime::Route>) -> futures_util::future::Ready<Result<bool, BoxError>>
       + Send
       + Sync
       + 'static {
    let recorder = recorder.clone();
    move |_route| {
        recorder.record(label);
        futures_util::future::ready(Ok(allow))
    }
}

/// ```text
/// /                 index → home
/// ├── a
/// ├── b
/// ├── dashboard
/// │   └── :id
/// ├── posts         preload: status 201, title
/// │   └── [slug]    preload: slug prop, maxage 60
/// └── broken        preload fails
/// ```
pub fn app_tree() -> RouteTree {
    RouteTree::new(
        RouteNode::root()
            .index(RouteNode::literal("home"))
            .child(RouteNode::literal("a"))
            .child(RouteNode::literal("b"))
            .child(RouteNode::literal("dashboard").child(RouteNode::dynamic("id")))
            .child(
                RouteNode::literal("posts")
                    .decorator("layout")
                    .preload(|_route| async {
                        Ok::<_, BoxError>(
                            LoadResult::new()
                                .with_status(201)
                                .with_prop("title", "Posts")
                                .with_maxage(10),
                        )
                    })
                    .child(RouteNode::parse("[slug]").preload(|route| async move {
                        let slug = route.param("slug").unwrap_or_default().to_string();
                        Ok::<_, BoxError>(LoadResult::new().with_prop("slug", slug).with_maxage(60))
                    })),
            )
            .child(RouteNode::literal("broken").preload(|_route| async {
                Err::<LoadResult, BoxError>("backend unavailable".into())
            })),
    )
    .unwrap()
}

pub fn instance() -> Arc<RuntimeInstance> {
    RuntimeInstance::new(app_tree(), RouterConfig::default())
}

/// Poll `check` until it holds, failing the test after a second.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Reflector that only records install/uninstall/reflect calls.
pub struct RecordingReflector {
    pub label: &'static str,
    pub recorder: Recorder,
}

impl UrlReflector for RecordingReflector {
    fn kind(&self) -> Option<ReflectorKind> {
        None
    }

    fn install(&self) {
        self.recorder.record(format!("install:{}", self.label));
    }

    fn uninstall(&self) {
        self.recorder.record(format!("uninstall:{}", self.label));
    }

    fn reflect(&self) {
        self.recorder.record(format!("reflect:{}", self.label));
    }
}
