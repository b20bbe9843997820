//! Navigation scopes.
//!
//! # Data Flow
//! ```text
//! navigate(url, mode)
//!     → transform.rs (to_internal, in registration order)
//!     → Route::new (resolve against offset / root)
//!     → idempotence check (same URL as active → no-op)
//!     → pending slot (observable.rs)
//!     → hooks.rs before-change → components → guards → preloads
//!     → active slot swap + history buffer
//!     → hooks.rs after-change
//!     → reflector.reflect() on the next scheduler tick
//! ```
//!
//! # Design Decisions
//! - One Router per navigation scope; several may share a page
//! - Newest navigation wins: a generation counter rejects older attempts that
//!   finish later (`Superseded`)
//! - Hooks are registered with removal tokens, never looked up by identity
//! - Pending/active slots are observable values, not bare fields

pub mod hooks;
pub mod observable;
pub mod query;
#[allow(clippy::module_inception)]
pub mod router;
pub mod transform;

pub use hooks::{AfterUrlChange, BeforeUrlChange, HookId, HookRegistry, OnDestroy};
pub use observable::{Observable, Subscription};
pub use query::{QueryCodec, UrlEncodedQuery};
pub use router::{NavigationError, Offset, Router, RouterOptions};
pub use transform::{BasePath, UrlTransform};
