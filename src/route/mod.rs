//! Route snapshots and their lifecycle.
//!
//! # States
//! ```text
//! Pending → HooksRun → ComponentsLoaded → GuardsPassed → Preloaded → Active
//!    │          │              │               │             │
//!    └──────────┴──────────────┴───────────────┴─────────────┴──→ Rejected
//! ```
//!
//! # Design Decisions
//! - A Route is created per navigation attempt and never reused
//! - URL, matched nodes and params are fixed at construction
//! - Lifecycle progress is an atomic state; components and preload data are
//!   written once, when their step completes
//! - Every step failure becomes a `Rejected` state carrying a LifecycleError;
//!   nothing is thrown past the owning Router

pub mod error;
pub mod load;
#[allow(clippy::module_inception)]
pub mod route;
pub mod state;

pub use error::LifecycleError;
pub use load::{LoadResult, NodeLoad};
pub use route::Route;
pub use state::{NavigationMode, RouteState};
