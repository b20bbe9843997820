//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → held in an ArcSwap by RuntimeInstance
//!
//! route manifest (TOML/JSON)
//!     → watcher.rs detects change
//!     → routing::load_manifest rebuilds the tree
//!     → host builds a new RuntimeInstance and calls merge_into
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    LogFormat, ObservabilityConfig, ReflectorConfig, RouterConfig, RouterSection, SsrConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ManifestWatcher;
