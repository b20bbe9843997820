//! Navigation metrics.
//!
//! # Metrics
//! - `router_navigations_total` (counter): navigations by router, outcome
//! - `router_navigation_duration_seconds` (histogram): time from request to
//!   activation or rejection
//! - `router_live_routers` (gauge): routers registered in the instance
//!
//! # Design Decisions
//! - Outcomes are a closed set: activated, rejected, unchanged, superseded
//! - Recording can be switched off from `observability.metrics_enabled`

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, gauge, histogram};

static ENABLED: AtomicBool = AtomicBool::new(true);

pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

pub fn record_navigation(router: &str, outcome: &'static str, elapsed: Duration) {
    if !is_enabled() {
        return;
    }
    counter!("router_navigations_total", "router" => router.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!("router_navigation_duration_seconds", "router" => router.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_live_routers(count: usize) {
    if !is_enabled() {
        return;
    }
    gauge!("router_live_routers").set(count as f64);
}
