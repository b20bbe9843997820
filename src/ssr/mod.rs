//! Server-side rendering boundary.
//!
//! # Data Flow
//! ```text
//! composite URL
//!     → composite codec (split per router)
//!     → renderer.load(primary url)
//!     → prime.rs: reuse or create each router, navigate stale ones (replace),
//!       await every router's first activation concurrently
//!     → renderer.render(instance)
//!     → RenderOutput (fragments + status/props/redirect/maxage/error/load)
//!     → fill_template (optional, placeholder substitution)
//! ```
//!
//! # Design Decisions
//! - Rendering itself is an external collaborator behind the [`Renderer`] trait
//! - A router whose first navigation was rejected is not awaited; its
//!   failure is reported through the output instead
//! - Waiting for readiness is bounded by `ssr.ready_timeout_ms`

pub mod outline;
pub mod prime;
pub mod render;

pub use outline::OutlineRenderer;
pub use prime::{preload_all_routers, preload_all_routers_from_str};
pub use render::{fill_template, render_module, Css, Fragments, RenderOutput, Renderer};

use crate::composite::CompositeUrlError;
use crate::router::NavigationError;
use crate::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum SsrError {
    #[error("malformed composite URL: {0}")]
    Composite(#[from] CompositeUrlError),
    #[error("navigation failed: {0}")]
    Navigation(#[from] NavigationError),
    #[error("router `{router}` did not become ready in time")]
    Timeout { router: String },
    #[error("load failed: {0}")]
    Load(#[source] BoxError),
    #[error("render failed: {0}")]
    Render(#[source] BoxError),
}
