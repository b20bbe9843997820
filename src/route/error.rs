//! Lifecycle failures.
//!
//! Every variant ends a navigation attempt in the `Rejected` state. They are
//! recorded on the Route and never propagated past `Router::navigate`.

use crate::route::state::RouteState;
use crate::routing::NoMatchError;
use crate::BoxError;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    NoMatch(#[from] NoMatchError),

    #[error("before-change hook rejected the navigation")]
    HookRejected,

    #[error("before-change hook failed: {source}")]
    Hook {
        #[source]
        source: BoxError,
    },

    #[error("failed to load component for `{segment}`: {source}")]
    ComponentLoad {
        segment: String,
        #[source]
        source: BoxError,
    },

    #[error("guard on `{segment}` rejected the navigation")]
    GuardRejected { segment: String },

    #[error("guard on `{segment}` failed: {source}")]
    Guard {
        segment: String,
        #[source]
        source: BoxError,
    },

    #[error("preload for `{segment}` failed: {source}")]
    Preload {
        segment: String,
        #[source]
        source: BoxError,
    },

    #[error("navigation superseded by a newer request")]
    Superseded,

    #[error("lifecycle step expected state {expected:?}, found {found:?}")]
    InvalidState {
        expected: RouteState,
        found: RouteState,
    },
}

impl LifecycleError {
    /// HTTP-like status a renderer can report for this failure.
    pub fn status(&self) -> u16 {
        match self {
            LifecycleError::NoMatch(_) => 404,
            LifecycleError::HookRejected | LifecycleError::GuardRejected { .. } => 403,
            LifecycleError::Superseded => 409,
            _ => 500,
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LifecycleError::NoMatch(_) => "no_match",
            LifecycleError::HookRejected | LifecycleError::Hook { .. } => "hook",
            LifecycleError::ComponentLoad { .. } => "component",
            LifecycleError::GuardRejected { .. } | LifecycleError::Guard { .. } => "guard",
            LifecycleError::Preload { .. } => "preload",
            LifecycleError::Superseded => "superseded",
            LifecycleError::InvalidState { .. } => "state",
        }
    }
}
