//! Route tree and resolution.
//!
//! # Data Flow
//! ```text
//! Tree construction (at startup):
//!     manifest.rs (declarative file) or RouteNode builders
//!     → node.rs (validate sibling segments)
//!     → Freeze as immutable RouteTree
//!
//! Resolution (per navigation):
//!     path string
//!     → resolver.rs (segment-by-segment descent)
//!     → Return: matched node chain + params, or NoMatchError
//! ```
//!
//! # Design Decisions
//! - Tree is immutable once built (shared via Arc, no locks)
//! - Literal segments win over dynamic ones, with backtracking
//! - Deterministic: same path against same tree always yields the same chain
//! - Explicit NoMatchError rather than a silent fallback

pub mod manifest;
pub mod node;
pub mod resolver;

pub use manifest::{load_manifest, ManifestError, NodeManifest};
pub use node::{
    Component, ComponentLoader, Guard, Preload, RouteNode, RouteTree, Segment, TreeError,
};
pub use resolver::{resolve, same_location, NoMatchError, Resolution};
