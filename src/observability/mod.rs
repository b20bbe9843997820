//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routers, reflectors, the registry and SSR produce:
//!     → logging.rs (structured log events, `router` / `route_id` fields)
//!     → metrics.rs (navigation counters and latency, live router gauge)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON or pretty)
//!     → Whatever `metrics` recorder the host installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Route ids flow through every lifecycle event for correlation
//! - Metrics go through the `metrics` facade; without a recorder they cost
//!   next to nothing
pub mod logging;
pub mod metrics;
