//! URL reflection strategies.
//!
//! # Data Flow
//! ```text
//! External medium changes (address bar pop, restored storage key)
//!     → reflector calls back into Router::navigate
//!
//! Router activates a Route
//!     → after-change hooks
//!     → next scheduler tick
//!     → reflector.reflect() writes the canonical URL to its medium
//! ```
//!
//! # Variants
//! - address.rs: composite URL of every address-reflected router, kept in a
//!   [`History`] medium (push/replace, pop events navigate back)
//! - storage.rs: one key per router in a [`Storage`] medium
//! - internal.rs: no medium; the URL lives only in the Router (SSR)
//!
//! # Design Decisions
//! - Exactly one reflector per Router; swapping uninstalls before installing
//! - Reflectors hold a Weak reference, so they never keep a Router alive
//! - Media are traits so hosts can plug in a real browser or key-value store

pub mod address;
pub mod history;
pub mod internal;
pub mod storage;

use std::sync::Weak;

use serde::{Deserialize, Serialize};

use crate::router::Router;
use crate::runtime::RuntimeInstance;

pub use address::AddressReflector;
pub use history::{History, MemoryHistory};
pub use internal::InternalReflector;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageReflector};

/// Synchronizes a Router's canonical URL with an external medium.
pub trait UrlReflector: Send + Sync {
    /// Built-in variant this reflector implements, if any.
    fn kind(&self) -> Option<ReflectorKind> {
        None
    }

    /// Start observing the medium.
    fn install(&self) {}

    /// Stop observing the medium.
    fn uninstall(&self) {}

    /// Write the Router's current URL to the medium.
    fn reflect(&self) {}
}

/// Built-in reflector variants, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReflectorKind {
    #[default]
    Internal,
    Address,
    Storage,
}

impl ReflectorKind {
    /// Build the variant bound to `router`, using the instance's media.
    pub fn build(self, router: Weak<Router>, instance: &RuntimeInstance) -> Box<dyn UrlReflector> {
        match self {
            ReflectorKind::Internal => Box::new(InternalReflector),
            ReflectorKind::Address => Box::new(AddressReflector::new(router, instance.history())),
            ReflectorKind::Storage => {
                let config = instance.config();
                Box::new(StorageReflector::new(
                    router,
                    instance.storage(),
                    &config.reflector.storage_prefix,
                ))
            }
        }
    }
}
