//! The Router: one navigation scope.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Instant;

use arc_swap::{ArcSwap, ArcSwapOption};
use futures_util::future::FutureExt;
use url::{Position, Url};

use crate::observability::metrics;
use crate::reflector::{InternalReflector, ReflectorKind, UrlReflector};
use crate::route::{LifecycleError, NavigationMode, Route};
use crate::router::hooks::{HookId, RouterHooks};
use crate::router::observable::Observable;
use crate::router::query::{QueryCodec, UrlEncodedQuery};
use crate::router::transform::UrlTransform;
use crate::routing::{same_location, RouteNode};
use crate::runtime::RuntimeInstance;
use crate::BoxError;

/// Unexpected navigation failures. Lifecycle rejections are not errors.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("router `{name}` has been destroyed")]
    RouterDestroyed { name: String },
}

/// Subtree a Router resolves against.
#[derive(Debug, Clone)]
pub enum Offset {
    Node(Arc<RouteNode>),
    /// Looked up in the instance's tree on every resolution, so it survives
    /// a tree swap.
    Path(String),
}

/// Construction options for a Router.
#[derive(Debug, Default)]
pub struct RouterOptions {
    /// Unique within the instance. Empty for the primary router.
    pub name: String,
    /// Node of the enclosing component; the offset falls back to it.
    pub parent_node: Option<Arc<RouteNode>>,
    pub offset: Option<Offset>,
    /// Defaults to `router.default_reflector` from the config.
    pub reflector: Option<ReflectorKind>,
    pub query_codec: Option<Arc<dyn QueryCodec>>,
    pub url_transforms: Vec<Arc<dyn UrlTransform>>,
}

impl RouterOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn offset(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn parent_node(mut self, node: Arc<RouteNode>) -> Self {
        self.parent_node = Some(node);
        self
    }

    pub fn reflector(mut self, kind: ReflectorKind) -> Self {
        self.reflector = Some(kind);
        self
    }

    pub fn url_transform(mut self, transform: Arc<dyn UrlTransform>) -> Self {
        self.url_transforms.push(transform);
        self
    }
}

/// A navigation scope holding a pending and an active Route.
pub struct Router {
    name: String,
    me: Weak<Router>,
    instance: ArcSwap<Weak<RuntimeInstance>>,
    root_node: ArcSwap<RouteNode>,
    parent_node: Option<Arc<RouteNode>>,
    offset: ArcSwapOption<Offset>,

    pending_route: Observable<Option<Arc<Route>>>,
    active_route: Observable<Option<Arc<Route>>>,
    last_rejected: ArcSwapOption<Route>,
    history: Mutex<VecDeque<Arc<Route>>>,
    history_limit: usize,
    generation: AtomicU64,
    destroyed: AtomicBool,

    reflector: ArcSwap<Box<dyn UrlReflector>>,
    url_transforms: RwLock<Vec<Arc<dyn UrlTransform>>>,
    query_codec: Arc<dyn QueryCodec>,
    hooks: RouterHooks,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("name", &self.name)
            .field("url", &self.url())
            .field("pending", &self.pending_route.get().map(|r| r.url().to_string()))
            .field("reflector", &self.reflector.load().kind())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Renders the active URL, empty before the first activation.
impl fmt::Display for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url().as_deref().unwrap_or_default())
    }
}

impl Router {
    /// Build an unregistered Router. Use `RuntimeInstance::create_router`.
    pub(crate) fn new(instance: &Arc<RuntimeInstance>, options: RouterOptions) -> Arc<Self> {
        let config = instance.config();
        let RouterOptions {
            name,
            parent_node,
            offset,
            reflector: _,
            query_codec,
            url_transforms,
        } = options;

        let router = Arc::new_cyclic(|me: &Weak<Router>| Self {
            name,
            me: me.clone(),
            instance: ArcSwap::from_pointee(Arc::downgrade(instance)),
            root_node: ArcSwap::new(instance.tree().root().clone()),
            parent_node,
            offset: ArcSwapOption::new(offset.map(Arc::new)),
            pending_route: Observable::new(None),
            active_route: Observable::new(None),
            last_rejected: ArcSwapOption::empty(),
            history: Mutex::new(VecDeque::new()),
            history_limit: config.router.history_limit,
            generation: AtomicU64::new(0),
            destroyed: AtomicBool::new(false),
            reflector: ArcSwap::from_pointee(Box::new(InternalReflector) as Box<dyn UrlReflector>),
            url_transforms: RwLock::new(url_transforms),
            query_codec: query_codec.unwrap_or_else(|| Arc::new(UrlEncodedQuery)),
            hooks: RouterHooks::default(),
        });

        tracing::debug!(router = %router.name, "created new router");
        router
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_primary(&self) -> bool {
        self.name.is_empty()
    }

    pub(crate) fn downgrade(&self) -> Weak<Router> {
        self.me.clone()
    }

    /// The instance this Router is registered with.
    pub fn instance(&self) -> Option<Arc<RuntimeInstance>> {
        self.instance.load().upgrade()
    }

    /// Point this Router at another instance (hot reload).
    pub(crate) fn rebind(&self, instance: &Arc<RuntimeInstance>) {
        self.instance.store(Arc::new(Arc::downgrade(instance)));
        self.root_node.store(instance.tree().root().clone());
    }

    // --- Observable state ---

    pub fn pending_route(&self) -> &Observable<Option<Arc<Route>>> {
        &self.pending_route
    }

    pub fn active_route(&self) -> &Observable<Option<Arc<Route>>> {
        &self.active_route
    }

    /// The most recent rejected attempt, cleared by the next activation.
    /// Attempts cancelled by a newer navigation are not recorded.
    pub fn last_rejected(&self) -> Option<Arc<Route>> {
        self.last_rejected.load_full()
    }

    /// Previously active Routes, oldest first.
    pub fn history(&self) -> Vec<Arc<Route>> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Params of the active Route.
    pub fn params(&self) -> BTreeMap<String, String> {
        self.active_route
            .get()
            .map(|route| route.params().clone())
            .unwrap_or_default()
    }

    /// Query params of the active Route.
    pub fn query(&self) -> BTreeMap<String, String> {
        self.active_route
            .get()
            .map(|route| route.query().clone())
            .unwrap_or_default()
    }

    /// Active URL, in router-internal form.
    pub fn url(&self) -> Option<String> {
        self.active_route.get().map(|route| route.url().to_string())
    }

    /// Active URL after every transform's `to_external`, last registered first.
    pub fn external_url(&self) -> Option<String> {
        let url = self.url()?;
        let transforms = self.url_transforms.read().unwrap_or_else(PoisonError::into_inner);
        Some(
            transforms
                .iter()
                .rev()
                .fold(url, |url, transform| transform.to_external(&url)),
        )
    }

    /// Whether the active Route sits at `url` (router-internal form).
    /// Trailing slashes and empty path segments are ignored.
    pub fn is_at(&self, url: &str) -> bool {
        self.active_route
            .get()
            .is_some_and(|route| same_location(route.url(), url))
    }

    /// `url` in the router-internal form Routes carry: made relative and
    /// passed through every transform's `to_internal`.
    pub fn internal_url(&self, url: &str) -> Result<String, NavigationError> {
        self.normalize_url(url)
    }

    /// Resolves the first time this Router has an active Route.
    pub async fn ready(&self) {
        let mut rx = self.active_route.subscribe();
        let _ = rx.wait_for(|route| route.is_some()).await;
    }

    // --- Navigation ---

    pub async fn push(&self, url: &str) -> Result<bool, NavigationError> {
        self.navigate(url, NavigationMode::Push).await
    }

    pub async fn replace(&self, url: &str) -> Result<bool, NavigationError> {
        self.navigate(url, NavigationMode::Replace).await
    }

    pub async fn pop(&self, url: &str) -> Result<bool, NavigationError> {
        self.navigate(url, NavigationMode::Pop).await
    }

    /// Navigate to `url`.
    ///
    /// Returns `Ok(false)` without side effects when `url` is already active,
    /// otherwise `Ok(true)` once the attempt finished, whether the new Route
    /// became active or was rejected. Inspect [`Router::active_route`] or
    /// [`Router::last_rejected`] to tell them apart.
    pub async fn navigate(&self, url: &str, mode: NavigationMode) -> Result<bool, NavigationError> {
        self.attempt(url, mode, false).await
    }

    /// Re-resolve the active URL, bypassing the same-URL check.
    pub async fn reload(&self) -> Result<bool, NavigationError> {
        match self.url() {
            Some(url) => self.attempt(&url, NavigationMode::Replace, true).await,
            None => Ok(false),
        }
    }

    async fn attempt(
        &self,
        url: &str,
        mode: NavigationMode,
        force: bool,
    ) -> Result<bool, NavigationError> {
        if self.is_destroyed() {
            return Err(NavigationError::RouterDestroyed {
                name: self.name.clone(),
            });
        }
        let started = Instant::now();
        let url = self.normalize_url(url)?;
        tracing::debug!(router = %self.name, url = %url, mode = %mode, "set url");

        if !force && self.is_at(&url) {
            metrics::record_navigation(&self.name, "unchanged", started.elapsed());
            return Ok(false);
        }

        let route = Arc::new(Route::new(self, url, mode));
        if route.is_rejected() {
            // Unresolvable URLs leave in-flight navigations and the pending slot alone.
            tracing::debug!(
                router = %self.name,
                url = %route.url(),
                "url did not resolve"
            );
            self.last_rejected.store(Some(route));
            metrics::record_navigation(&self.name, "rejected", started.elapsed());
            return Ok(true);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = match self.drive(&route, generation).await {
            Ok(()) => {
                self.activate(&route);
                "activated"
            }
            Err(err) => {
                tracing::debug!(
                    router = %self.name,
                    url = %route.url(),
                    route_id = %route.id(),
                    reason = %err,
                    "navigation rejected"
                );
                let superseded = matches!(err, LifecycleError::Superseded);
                route.reject(err);
                if superseded {
                    // The newer attempt owns the outcome.
                    "superseded"
                } else {
                    self.last_rejected.store(Some(route.clone()));
                    "rejected"
                }
            }
        };

        self.pending_route.update_if(|pending| match pending {
            Some(current) if Arc::ptr_eq(current, &route) => {
                *pending = None;
                true
            }
            _ => false,
        });
        metrics::record_navigation(&self.name, outcome, started.elapsed());
        Ok(true)
    }

    async fn drive(&self, route: &Arc<Route>, generation: u64) -> Result<(), LifecycleError> {
        tracing::debug!(router = %self.name, route_id = %route.id(), url = %route.url(), "set pending route");
        self.pending_route.set(Some(route.clone()));

        let hooks = self.hooks.before_url_change.snapshot();
        route.run_before_url_change_hooks(&hooks).await?;
        self.ensure_current(generation)?;

        tracing::debug!(router = %self.name, route_id = %route.id(), "load components");
        route.load_components().await?;
        self.ensure_current(generation)?;

        tracing::debug!(router = %self.name, route_id = %route.id(), "run guards");
        route.run_guards().await?;
        self.ensure_current(generation)?;

        tracing::debug!(router = %self.name, route_id = %route.id(), "run preloads");
        route.run_preloads().await?;
        self.ensure_current(generation)
    }

    fn ensure_current(&self, generation: u64) -> Result<(), LifecycleError> {
        if self.generation.load(Ordering::SeqCst) == generation {
            Ok(())
        } else {
            Err(LifecycleError::Superseded)
        }
    }

    fn activate(&self, route: &Arc<Route>) {
        route.activate();
        let previous = self.active_route.set(Some(route.clone()));
        self.last_rejected.store(None);
        tracing::debug!(router = %self.name, route_id = %route.id(), url = %route.url(), "set active route");

        if let Some(previous) = previous {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            history.push_back(previous);
            while history.len() > self.history_limit {
                history.pop_front();
            }
        }

        for hook in self.hooks.after_url_change.snapshot() {
            hook(route);
        }
        self.schedule_reflect();
    }

    /// Reflect on the next scheduler tick so sibling routers touched by the
    /// same navigation settle before anything is written to a shared medium.
    fn schedule_reflect(&self) {
        let reflector = self.reflector.load_full();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::task::yield_now().await;
                    reflector.reflect();
                });
            }
            Err(_) => reflector.reflect(),
        }
    }

    fn normalize_url(&self, url: &str) -> Result<String, NavigationError> {
        let url = if url.is_empty() { "/" } else { url };
        let url = if url.starts_with('/') {
            url.to_string()
        } else {
            let parsed = Url::parse(url).map_err(|source| NavigationError::InvalidUrl {
                url: url.to_string(),
                source,
            })?;
            parsed[Position::BeforePath..].to_string()
        };

        let transforms = self.url_transforms.read().unwrap_or_else(PoisonError::into_inner);
        Ok(transforms
            .iter()
            .fold(url, |url, transform| transform.to_internal(&url)))
    }

    // --- Scoping ---

    /// Node resolution starts from: offset, else parent node, else tree root.
    pub fn resolution_root(&self) -> Arc<RouteNode> {
        self.offset_node()
            .or_else(|| self.parent_node.clone())
            .unwrap_or_else(|| self.root_node.load_full())
    }

    pub fn offset_node(&self) -> Option<Arc<RouteNode>> {
        let offset = self.offset.load_full()?;
        match offset.as_ref() {
            Offset::Node(node) => Some(node.clone()),
            Offset::Path(path) => {
                let node = self.instance().and_then(|instance| instance.tree().find(path));
                if node.is_none() {
                    tracing::warn!(router = %self.name, offset = %path, "offset path matches no node");
                }
                node
            }
        }
    }

    /// Scope this Router to a subtree. `None` falls back to the parent node.
    pub fn set_offset(&self, offset: Option<Offset>) {
        let offset = offset.or_else(|| self.parent_node.clone().map(Offset::Node));
        self.offset.store(offset.map(Arc::new));
    }

    pub fn query_codec(&self) -> &dyn QueryCodec {
        self.query_codec.as_ref()
    }

    pub fn add_url_transform(&self, transform: Arc<dyn UrlTransform>) {
        self.url_transforms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(transform);
    }

    // --- Reflectors ---

    pub fn reflector(&self) -> Arc<Box<dyn UrlReflector>> {
        self.reflector.load_full()
    }

    /// Swap the reflector: uninstall the current one, build the replacement
    /// bound to this Router, install it.
    pub fn set_reflector<F>(&self, factory: F)
    where
        F: FnOnce(Weak<Router>) -> Box<dyn UrlReflector>,
    {
        let previous = self.reflector.load_full();
        previous.uninstall();

        let next = Arc::new(factory(self.me.clone()));
        self.reflector.store(next.clone());
        tracing::debug!(router = %self.name, reflector = ?next.kind(), "install url reflector");
        next.install();
    }

    pub fn set_reflector_kind(&self, kind: ReflectorKind) {
        match self.instance() {
            Some(instance) => self.set_reflector(|router| kind.build(router, &instance)),
            None => {
                tracing::warn!(router = %self.name, reflector = ?kind, "router has no instance, using internal reflector");
                self.set_reflector(|_| Box::new(InternalReflector));
            }
        }
    }

    // --- Hooks ---

    pub fn hooks(&self) -> &RouterHooks {
        &self.hooks
    }

    pub fn before_url_change<F, Fut>(&self, hook: F) -> HookId
    where
        F: Fn(Arc<Route>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
    {
        self.hooks
            .before_url_change
            .add(Arc::new(move |route| hook(route).boxed()))
    }

    pub fn after_url_change<F>(&self, hook: F) -> HookId
    where
        F: Fn(&Arc<Route>) + Send + Sync + 'static,
    {
        self.hooks.after_url_change.add(Arc::new(hook))
    }

    pub fn on_destroy<F>(&self, hook: F) -> HookId
    where
        F: Fn(&Router) + Send + Sync + 'static,
    {
        self.hooks.on_destroy.add(Arc::new(hook))
    }

    // --- Teardown ---

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Deregister from the instance and fire on-destroy hooks. Idempotent.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(router = %self.name, "destroying router");

        self.reflector.load().uninstall();
        if let Some(instance) = self.instance() {
            instance.deregister(self);
        }
        for hook in self.hooks.on_destroy.snapshot() {
            hook(self);
        }
    }
}
