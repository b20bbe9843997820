//! Hook registries.
//!
//! Registering a hook returns a [`HookId`]; passing it back to
//! [`HookRegistry::remove`] unregisters exactly that hook.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures_util::future::BoxFuture;

use crate::route::Route;
use crate::router::Router;
use crate::BoxError;

/// Runs before a pending Route starts loading. `Ok(false)` or `Err` vetoes it.
pub type BeforeUrlChange =
    dyn Fn(Arc<Route>) -> BoxFuture<'static, Result<bool, BoxError>> + Send + Sync;

/// Runs after a Route became active.
pub type AfterUrlChange = dyn Fn(&Arc<Route>) + Send + Sync;

/// Runs when a Router is destroyed.
pub type OnDestroy = dyn Fn(&Router) + Send + Sync;

/// Removal token for a registered hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// Ordered list of hooks; invocation follows registration order.
pub struct HookRegistry<F: ?Sized> {
    next_id: AtomicU64,
    hooks: RwLock<Vec<(HookId, Arc<F>)>>,
}

impl<F: ?Sized> Default for HookRegistry<F> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            hooks: RwLock::new(Vec::new()),
        }
    }
}

impl<F: ?Sized> fmt::Debug for HookRegistry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl<F: ?Sized> HookRegistry<F> {
    pub fn add(&self, hook: Arc<F>) -> HookId {
        let id = HookId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, hook));
        id
    }

    /// Unregister a hook. Returns false if it was already removed.
    pub fn remove(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.write().unwrap_or_else(PoisonError::into_inner);
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before
    }

    /// Current hooks, in registration order.
    ///
    /// Callers invoke the snapshot, so a hook may register or remove hooks
    /// without deadlocking.
    pub fn snapshot(&self) -> Vec<Arc<F>> {
        self.hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, hook)| hook.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The three hook registries of a Router.
#[derive(Debug, Default)]
pub struct RouterHooks {
    pub before_url_change: HookRegistry<BeforeUrlChange>,
    pub after_url_change: HookRegistry<AfterUrlChange>,
    pub on_destroy: HookRegistry<OnDestroy>,
}
