//! The router registry.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::RouterConfig;
use crate::observability::metrics;
use crate::reflector::{History, MemoryHistory, MemoryStorage, ReflectorKind, Storage};
use crate::router::{Router, RouterOptions};
use crate::routing::RouteTree;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("a router named `{name}` already exists")]
    DuplicateRouter { name: String },
}

pub struct RuntimeInstance {
    tree: RouteTree,
    routers: DashMap<String, Arc<Router>>,
    config: ArcSwap<RouterConfig>,
    history: Arc<dyn History>,
    storage: Arc<dyn Storage>,
}

impl fmt::Debug for RuntimeInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.routers.iter().map(|r| r.key().clone()).collect();
        f.debug_struct("RuntimeInstance")
            .field("routers", &names)
            .field("history", &self.history)
            .field("storage", &self.storage)
            .finish()
    }
}

pub struct RuntimeInstanceBuilder {
    tree: RouteTree,
    config: RouterConfig,
    history: Option<Arc<dyn History>>,
    storage: Option<Arc<dyn Storage>>,
}

impl RuntimeInstanceBuilder {
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Medium for address reflectors. Defaults to a [`MemoryHistory`] at `/`.
    pub fn history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    /// Medium for storage reflectors. Defaults to a [`MemoryStorage`].
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn build(self) -> Arc<RuntimeInstance> {
        Arc::new(RuntimeInstance {
            tree: self.tree,
            routers: DashMap::new(),
            config: ArcSwap::from_pointee(self.config),
            history: self
                .history
                .unwrap_or_else(|| Arc::new(MemoryHistory::default())),
            storage: self
                .storage
                .unwrap_or_else(|| Arc::new(MemoryStorage::default())),
        })
    }
}

impl RuntimeInstance {
    pub fn builder(tree: RouteTree) -> RuntimeInstanceBuilder {
        RuntimeInstanceBuilder {
            tree,
            config: RouterConfig::default(),
            history: None,
            storage: None,
        }
    }

    pub fn new(tree: RouteTree, config: RouterConfig) -> Arc<Self> {
        Self::builder(tree).config(config).build()
    }

    pub fn tree(&self) -> &RouteTree {
        &self.tree
    }

    pub fn config(&self) -> Arc<RouterConfig> {
        self.config.load_full()
    }

    /// Replace the configuration. Routers created afterwards see the new one.
    pub fn set_config(&self, config: RouterConfig) {
        self.config.store(Arc::new(config));
    }

    pub fn history(&self) -> Arc<dyn History> {
        self.history.clone()
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    /// Create and register a Router, then install its reflector.
    pub fn create_router(
        self: &Arc<Self>,
        options: RouterOptions,
    ) -> Result<Arc<Router>, RegistryError> {
        let kind = options
            .reflector
            .unwrap_or(self.config().router.default_reflector);

        let router = match self.routers.entry(options.name.clone()) {
            Entry::Occupied(_) => {
                return Err(RegistryError::DuplicateRouter { name: options.name });
            }
            Entry::Vacant(slot) => slot.insert(Router::new(self, options)).value().clone(),
        };
        metrics::record_live_routers(self.routers.len());

        // Installing may read the registry, so the entry must be released first.
        if kind != ReflectorKind::Internal {
            router.set_reflector_kind(kind);
        }
        Ok(router)
    }

    pub fn router(&self, name: &str) -> Option<Arc<Router>> {
        self.routers.get(name).map(|r| r.value().clone())
    }

    /// The Router called `name`, created with default options on first reference.
    pub fn router_or_create(self: &Arc<Self>, name: &str) -> Arc<Router> {
        if let Some(router) = self.router(name) {
            return router;
        }
        match self.create_router(RouterOptions::named(name)) {
            Ok(router) => router,
            // Lost a creation race; the winner is registered.
            Err(RegistryError::DuplicateRouter { .. }) => match self.router(name) {
                Some(router) => router,
                None => self.router_or_create(name),
            },
        }
    }

    pub fn primary(self: &Arc<Self>) -> Arc<Router> {
        self.router_or_create("")
    }

    /// Live Routers sorted by name, the primary first.
    pub fn routers(&self) -> Vec<Arc<Router>> {
        let mut routers: Vec<Arc<Router>> =
            self.routers.iter().map(|r| r.value().clone()).collect();
        routers.sort_by(|a, b| a.name().cmp(b.name()));
        routers
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Remove `router` if it is the one registered under its name.
    pub(crate) fn deregister(&self, router: &Router) {
        let removed = self
            .routers
            .remove_if(router.name(), |_, registered| {
                std::ptr::eq(Arc::as_ptr(registered), router)
            })
            .is_some();
        if removed {
            tracing::debug!(router = %router.name(), "deregistered router");
            metrics::record_live_routers(self.routers.len());
        }
    }
}

/// Move the live Routers of `old` into `new` (hot reload).
///
/// Routers whose name is already taken in `new` are destroyed. The moved
/// Routers resolve against `new`'s tree from their next navigation on.
/// Returns how many Routers were carried over.
pub fn merge_into(new: &Arc<RuntimeInstance>, old: &RuntimeInstance) -> usize {
    let names: Vec<String> = old.routers.iter().map(|r| r.key().clone()).collect();
    let mut moved = 0;

    for name in names {
        let Some((name, router)) = old.routers.remove(&name) else {
            continue;
        };
        match new.routers.entry(name) {
            Entry::Occupied(slot) => {
                tracing::debug!(router = %slot.key(), "router name taken in new instance, destroying old router");
                drop(slot);
                router.destroy();
            }
            Entry::Vacant(slot) => {
                router.rebind(new);
                slot.insert(router);
                moved += 1;
            }
        }
    }

    metrics::record_live_routers(new.routers.len());
    tracing::info!(moved, "merged routers into new runtime instance");
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteNode;

    fn tree() -> RouteTree {
        RouteTree::new(
            RouteNode::root()
                .index(RouteNode::literal("home"))
                .child(RouteNode::literal("a")),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let instance = RuntimeInstance::new(tree(), RouterConfig::default());
        let side = instance.create_router(RouterOptions::named("side")).unwrap();

        assert!(Arc::ptr_eq(&instance.router("side").unwrap(), &side));
        assert_eq!(
            instance.create_router(RouterOptions::named("side")).unwrap_err(),
            RegistryError::DuplicateRouter {
                name: "side".to_string()
            }
        );

        let primary = instance.primary();
        assert!(primary.is_primary());
        assert!(Arc::ptr_eq(&instance.router_or_create(""), &primary));
        let names: Vec<_> = instance.routers().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["", "side"]);
    }

    #[tokio::test]
    async fn test_destroy_deregisters() {
        let instance = RuntimeInstance::new(tree(), RouterConfig::default());
        let side = instance.router_or_create("side");
        let other = instance.router_or_create("other");

        side.destroy();
        side.destroy();
        assert!(instance.router("side").is_none());
        assert!(instance.router("other").is_some());
        assert!(!other.is_destroyed());
        assert!(side.push("/a").await.is_err());
    }

    #[tokio::test]
    async fn test_merge_into_moves_routers() {
        let old = RuntimeInstance::new(tree(), RouterConfig::default());
        let kept = old.router_or_create("side");
        kept.push("/a").await.unwrap();
        let clashing = old.router_or_create("");

        let new = RuntimeInstance::new(tree(), RouterConfig::default());
        let fresh_primary = new.primary();

        assert_eq!(merge_into(&new, &old), 1);
        assert!(old.is_empty());
        assert!(clashing.is_destroyed());
        assert!(Arc::ptr_eq(&new.primary(), &fresh_primary));

        let moved = new.router("side").unwrap();
        assert!(Arc::ptr_eq(&moved, &kept));
        assert!(Arc::ptr_eq(&moved.instance().unwrap(), &new));
        assert_eq!(moved.url().as_deref(), Some("/a"));
    }
}
