//! Runtime context shared by every Router.
//!
//! # Responsibilities
//! - Own the frozen RouteTree and the registry of live Routers
//! - Hold the runtime configuration and the reflector media
//! - Carry live Routers across a hot reload (`merge_into`)
//!
//! # Design Decisions
//! - An explicit context object, passed to every Router; no global singleton
//! - Routers register on creation and deregister on destroy, keyed by name
//! - Configuration sits behind an `ArcSwap` so it can be replaced atomically

pub mod instance;

pub use instance::{merge_into, RegistryError, RuntimeInstance, RuntimeInstanceBuilder};
