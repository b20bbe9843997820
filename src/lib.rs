//! Route runtime: a routing state machine for component-tree applications.
//!
//! # Architecture Overview
//!
//! ```text
//!     navigation request (address bar, link, API call, SSR composite URL)
//!         │
//!         ▼
//!   ┌────────────┐   split per router   ┌────────────┐
//!   │ composite  │─────────────────────▶│   router   │ (one per navigation scope)
//!   │   codec    │                      └─────┬──────┘
//!   └────────────┘                            │ url → route
//!                                             ▼
//!   ┌────────────┐   matched chain      ┌────────────┐
//!   │  routing   │◀─────────────────────│   route    │ pending → hooks → components
//!   │ (resolver) │                      │ lifecycle  │ → guards → preloads → active
//!   └────────────┘                      └─────┬──────┘
//!                                             │ after-change (next tick)
//!                                             ▼
//!                                       ┌────────────┐
//!                                       │ reflector  │ address bar / storage / internal
//!                                       └────────────┘
//!
//!   runtime: registry of live routers + the route tree
//!   ssr:     primes every router named in a composite URL, then renders
//! ```

// Core subsystems
pub mod composite;
pub mod route;
pub mod router;
pub mod routing;
pub mod runtime;

// URL media
pub mod reflector;

// Rendering boundary
pub mod ssr;

// Cross-cutting concerns
pub mod config;
pub mod observability;

/// Error type returned by user-supplied callbacks (guards, preloads, hooks, loaders, renderers).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use composite::CompositeUrl;
pub use config::RouterConfig;
pub use route::{LifecycleError, LoadResult, NavigationMode, Route, RouteState};
pub use router::{NavigationError, Router, RouterOptions};
pub use routing::{NoMatchError, RouteNode, RouteTree, Segment};
pub use runtime::{merge_into, RuntimeInstance};
pub use ssr::{render_module, RenderOutput, Renderer};
