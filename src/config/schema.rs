//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the runtime.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::reflector::ReflectorKind;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    /// Router defaults.
    pub router: RouterSection,

    /// Reflector media settings.
    pub reflector: ReflectorConfig,

    /// Server-side rendering settings.
    pub ssr: SsrConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Defaults applied to every Router.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RouterSection {
    /// Reflector installed when the router options name none.
    pub default_reflector: ReflectorKind,

    /// Previously active Routes kept per Router.
    pub history_limit: usize,
}

impl Default for RouterSection {
    fn default() -> Self {
        Self {
            default_reflector: ReflectorKind::Internal,
            history_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReflectorConfig {
    /// Storage key prefix; the router name is appended.
    pub storage_prefix: String,
}

impl Default for ReflectorConfig {
    fn default() -> Self {
        Self {
            storage_prefix: "__router-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SsrConfig {
    /// How long priming waits for each router (ms). 0 waits forever.
    pub ready_timeout_ms: u64,
}

impl Default for SsrConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Record navigation metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}
