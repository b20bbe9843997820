//! Address bar reflection.
//!
//! # Responsibilities
//! - On install: read this router's segment from the composite location and
//!   navigate to it, then follow traversal events
//! - On reflect: write the composite URL of every address-reflected router
//!
//! # Design Decisions
//! - Push/replace follows the active Route's mode; pop writes nothing
//! - Segments addressed to routers that are not registered yet are kept, so
//!   they survive until those routers are created and absorb them
//! - Writes are skipped when the location already matches

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::composite::CompositeUrl;
use crate::reflector::history::History;
use crate::reflector::{ReflectorKind, UrlReflector};
use crate::route::NavigationMode;
use crate::router::Router;

pub struct AddressReflector {
    router: Weak<Router>,
    history: Arc<dyn History>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl AddressReflector {
    pub fn new(router: Weak<Router>, history: Arc<dyn History>) -> Self {
        Self {
            router,
            history,
            listener: Mutex::new(None),
        }
    }
}

/// The URL addressed to router `name` in a composite location.
fn segment_for(name: &str, location: &str) -> Option<String> {
    match location.parse::<CompositeUrl>() {
        Ok(composite) => composite.get(name).map(str::to_string),
        Err(err) => {
            tracing::warn!(location = %location, error = %err, "ignoring malformed address");
            None
        }
    }
}

impl UrlReflector for AddressReflector {
    fn kind(&self) -> Option<ReflectorKind> {
        Some(ReflectorKind::Address)
    }

    fn install(&self) {
        let Some(router) = self.router.upgrade() else {
            return;
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(router = %router.name(), "no async runtime, address changes will not be observed");
            return;
        };

        let initial = segment_for(router.name(), &self.history.location());
        let mut events = self.history.subscribe();
        let weak = self.router.clone();

        let task = handle.spawn(async move {
            if let Some(url) = initial {
                if let Some(router) = weak.upgrade() {
                    if let Err(err) = router.replace(&url).await {
                        tracing::warn!(router = %router.name(), error = %err, "failed to absorb address");
                    }
                }
            }

            loop {
                match events.recv().await {
                    Ok(location) => {
                        let Some(router) = weak.upgrade() else {
                            break;
                        };
                        let Some(url) = segment_for(router.name(), &location) else {
                            continue;
                        };
                        if let Err(err) = router.pop(&url).await {
                            tracing::warn!(router = %router.name(), error = %err, "failed to follow address");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "address listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        let previous = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn uninstall(&self) {
        if let Some(task) = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }

    fn reflect(&self) {
        let Some(router) = self.router.upgrade() else {
            return;
        };
        let Some(route) = router.active_route().get() else {
            return;
        };
        if route.mode() == NavigationMode::Pop {
            return;
        }
        let Some(instance) = router.instance() else {
            return;
        };

        let location = self.history.location();
        let live: Vec<(String, String)> = instance
            .routers()
            .into_iter()
            .filter(|r| r.reflector().kind() == Some(ReflectorKind::Address))
            .filter_map(|r| r.external_url().map(|url| (r.name().to_string(), url)))
            .collect();
        // Segments of routers that do not exist yet stay in the address.
        let pending = location
            .parse::<CompositeUrl>()
            .unwrap_or_default()
            .into_iter()
            .filter(|(name, _)| instance.router(name).is_none());
        let url = match CompositeUrl::from_pairs(live.into_iter().chain(pending)) {
            Ok(composite) => composite.to_string(),
            Err(err) => {
                tracing::warn!(router = %router.name(), error = %err, "cannot encode address");
                return;
            }
        };

        if url == location {
            return;
        }
        tracing::debug!(router = %router.name(), url = %url, mode = %route.mode(), "reflect to address");
        match route.mode() {
            NavigationMode::Push => self.history.push_state(&url),
            NavigationMode::Replace => self.history.replace_state(&url),
            NavigationMode::Pop => {}
        }
    }
}
