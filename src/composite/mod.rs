//! Composite URL protocol.
//!
//! One string carries the target URL of every router on a page:
//!
//! ```text
//! composite := segment (";" segment)*
//! segment   := (name "=")? url
//! name      := [\w-]+
//! ```
//!
//! The unnamed segment belongs to the primary router (name `""`); at most one
//! may appear. Example: `/dashboard;sidebar=/settings/profile`.
//!
//! # Design Decisions
//! - Decoding is strict: duplicate names and empty segments are errors
//! - Encoding writes the primary segment first, then named ones in order
//! - A primary URL that would read back as a named segment is refused

pub mod codec;

pub use codec::{CompositeUrl, CompositeUrlError};
