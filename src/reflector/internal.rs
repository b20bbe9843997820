//! In-memory reflection.

use crate::reflector::{ReflectorKind, UrlReflector};

/// Keeps the URL only inside the Router. Used for server-side rendering
/// and any other non-interactive run.
#[derive(Debug, Clone, Copy, Default)]
pub struct InternalReflector;

impl UrlReflector for InternalReflector {
    fn kind(&self) -> Option<ReflectorKind> {
        Some(ReflectorKind::Internal)
    }
}
