//! Route lifecycle state and navigation modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a Route.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteState {
    Pending = 0,
    HooksRun = 1,
    ComponentsLoaded = 2,
    GuardsPassed = 3,
    Preloaded = 4,
    Active = 5,
    Rejected = 6,
}

impl From<u8> for RouteState {
    fn from(val: u8) -> Self {
        match val {
            1 => RouteState::HooksRun,
            2 => RouteState::ComponentsLoaded,
            3 => RouteState::GuardsPassed,
            4 => RouteState::Preloaded,
            5 => RouteState::Active,
            6 => RouteState::Rejected,
            _ => RouteState::Pending,
        }
    }
}

impl RouteState {
    /// The state a successful step moves to.
    pub fn next(self) -> Option<RouteState> {
        match self {
            RouteState::Pending => Some(RouteState::HooksRun),
            RouteState::HooksRun => Some(RouteState::ComponentsLoaded),
            RouteState::ComponentsLoaded => Some(RouteState::GuardsPassed),
            RouteState::GuardsPassed => Some(RouteState::Preloaded),
            RouteState::Preloaded => Some(RouteState::Active),
            RouteState::Active | RouteState::Rejected => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RouteState::Active | RouteState::Rejected)
    }
}

/// How a navigation affects the external history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// New history entry.
    #[default]
    Push,
    /// Overwrite the current history entry.
    Replace,
    /// History traversal initiated by the medium itself; nothing is written back.
    Pop,
}

impl fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationMode::Push => f.write_str("push"),
            NavigationMode::Replace => f.write_str("replace"),
            NavigationMode::Pop => f.write_str("pop"),
        }
    }
}
