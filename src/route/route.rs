//! A single resolution result and its lifecycle steps.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use futures_util::future::try_join_all;
use uuid::Uuid;

use crate::route::error::LifecycleError;
use crate::route::load::{LoadResult, NodeLoad};
use crate::route::state::{NavigationMode, RouteState};
use crate::router::hooks::BeforeUrlChange;
use crate::router::Router;
use crate::routing::{resolve, Component, RouteNode};

/// Immutable snapshot of one navigation attempt.
///
/// Created by its Router for every `navigate` call and superseded, never
/// mutated, by the next one. Only the lifecycle state and the write-once
/// step outputs (components, preload data, rejection reason) change.
pub struct Route {
    id: Uuid,
    url: String,
    mode: NavigationMode,
    router_name: String,
    router: Weak<Router>,
    nodes: Vec<Arc<RouteNode>>,
    params: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    state: AtomicU8,
    components: OnceLock<Vec<Option<Component>>>,
    data: OnceLock<Vec<NodeLoad>>,
    error: OnceLock<LifecycleError>,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("router", &self.router_name)
            .field("url", &self.url)
            .field("mode", &self.mode)
            .field("state", &self.state())
            .field("nodes", &self.segments())
            .field("params", &self.params)
            .finish()
    }
}

impl Route {
    /// Resolve `url` for `router`.
    ///
    /// A URL that matches no node yields a Route that is already `Rejected`
    /// with [`LifecycleError::NoMatch`].
    pub fn new(router: &Router, url: String, mode: NavigationMode) -> Self {
        let root = router.resolution_root();
        let query = match url.split_once('?') {
            Some((_, search)) => {
                let search = search.split('#').next().unwrap_or_default();
                router.query_codec().parse(search)
            }
            None => BTreeMap::new(),
        };

        let mut route = Self {
            id: Uuid::new_v4(),
            url,
            mode,
            router_name: router.name().to_string(),
            router: router.downgrade(),
            nodes: Vec::new(),
            params: BTreeMap::new(),
            query,
            state: AtomicU8::new(RouteState::Pending as u8),
            components: OnceLock::new(),
            data: OnceLock::new(),
            error: OnceLock::new(),
        };

        match resolve(&root, route.path()) {
            Ok(resolution) => {
                route.nodes = resolution.nodes;
                route.params = resolution.params;
            }
            Err(err) => route.reject(err.into()),
        }
        route
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The resolved URL, query included.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The path component of the URL.
    pub fn path(&self) -> &str {
        self.url.split(['?', '#']).next().unwrap_or_default()
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn router_name(&self) -> &str {
        &self.router_name
    }

    /// The owning Router, if it is still alive.
    pub fn router(&self) -> Option<Arc<Router>> {
        self.router.upgrade()
    }

    /// Matched nodes, outer to inner. Empty if resolution failed.
    pub fn nodes(&self) -> &[Arc<RouteNode>] {
        &self.nodes
    }

    pub fn leaf(&self) -> Option<&Arc<RouteNode>> {
        self.nodes.last()
    }

    pub fn segments(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.segment().to_string()).collect()
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn state(&self) -> RouteState {
        RouteState::from(self.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.state() == RouteState::Active
    }

    pub fn is_rejected(&self) -> bool {
        self.state() == RouteState::Rejected
    }

    /// Why the Route was rejected.
    pub fn error(&self) -> Option<&LifecycleError> {
        self.error.get()
    }

    /// Loaded components, aligned with [`Route::nodes`].
    pub fn components(&self) -> &[Option<Component>] {
        self.components.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Preload results, outer to inner.
    pub fn data(&self) -> &[NodeLoad] {
        self.data.get().map(Vec::as_slice).unwrap_or_default()
    }

    /// Preload results merged along the chain, inner node winning.
    pub fn load(&self) -> LoadResult {
        self.data()
            .iter()
            .fold(LoadResult::default(), |acc, node| acc.merge(&node.result))
    }

    // --- Lifecycle ---

    /// Step 1: every before-change hook must approve the pending Route.
    pub async fn run_before_url_change_hooks(
        self: &Arc<Self>,
        hooks: &[Arc<BeforeUrlChange>],
    ) -> Result<(), LifecycleError> {
        self.expect_state(RouteState::Pending)?;
        for hook in hooks {
            match hook(self.clone()).await {
                Ok(true) => {}
                Ok(false) => return Err(LifecycleError::HookRejected),
                Err(source) => return Err(LifecycleError::Hook { source }),
            }
        }
        self.advance(RouteState::Pending)
    }

    /// Step 2: resolve every lazy component reference of the chain, concurrently.
    pub async fn load_components(&self) -> Result<(), LifecycleError> {
        self.expect_state(RouteState::HooksRun)?;
        let loads = self.nodes.iter().map(|node| async move {
            match node.component_loader() {
                Some(loader) => loader()
                    .await
                    .map(Some)
                    .map_err(|source| LifecycleError::ComponentLoad {
                        segment: node.segment().to_string(),
                        source,
                    }),
                None => Ok(None),
            }
        });
        let components = try_join_all(loads).await?;
        let _ = self.components.set(components);
        self.advance(RouteState::HooksRun)
    }

    /// Step 3: run guards outer to inner, stopping at the first veto.
    pub async fn run_guards(self: &Arc<Self>) -> Result<(), LifecycleError> {
        self.expect_state(RouteState::ComponentsLoaded)?;
        for node in &self.nodes {
            for guard in node.guards() {
                let segment = || node.segment().to_string();
                match guard(self.clone()).await {
                    Ok(true) => {}
                    Ok(false) => return Err(LifecycleError::GuardRejected { segment: segment() }),
                    Err(source) => {
                        return Err(LifecycleError::Guard {
                            segment: segment(),
                            source,
                        })
                    }
                }
            }
        }
        self.advance(RouteState::ComponentsLoaded)
    }

    /// Step 4: run preloads outer to inner and keep their results.
    pub async fn run_preloads(self: &Arc<Self>) -> Result<(), LifecycleError> {
        self.expect_state(RouteState::GuardsPassed)?;
        let mut data = Vec::new();
        for (depth, node) in self.nodes.iter().enumerate() {
            let Some(preload) = node.preload_fn() else {
                continue;
            };
            let result = preload(self.clone())
                .await
                .map_err(|source| LifecycleError::Preload {
                    segment: node.segment().to_string(),
                    source,
                })?;
            data.push(NodeLoad {
                depth,
                segment: node.segment().to_string(),
                result,
            });
        }
        let _ = self.data.set(data);
        self.advance(RouteState::GuardsPassed)
    }

    /// `Preloaded → Active`. Returns false if the Route was not preloaded.
    pub(crate) fn activate(&self) -> bool {
        self.advance(RouteState::Preloaded).is_ok()
    }

    /// Move to `Rejected`, keeping the first reason given.
    pub(crate) fn reject(&self, err: LifecycleError) {
        let _ = self.error.set(err);
        self.state.store(RouteState::Rejected as u8, Ordering::Release);
    }

    fn expect_state(&self, expected: RouteState) -> Result<(), LifecycleError> {
        let found = self.state();
        if found == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidState { expected, found })
        }
    }

    fn advance(&self, from: RouteState) -> Result<(), LifecycleError> {
        let Some(to) = from.next() else {
            return Err(LifecycleError::InvalidState {
                expected: from,
                found: self.state(),
            });
        };
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|found| LifecycleError::InvalidState {
                expected: from,
                found: RouteState::from(found),
            })
    }
}
