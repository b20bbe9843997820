//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (history limit > 0, known log level)
//! - Keep the storage prefix clear of composite URL separators
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::RouterConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.router.history_limit == 0 {
        errors.push(ValidationError::new(
            "router.history_limit",
            "must be greater than 0",
        ));
    }

    let prefix = &config.reflector.storage_prefix;
    if prefix.is_empty() {
        errors.push(ValidationError::new(
            "reflector.storage_prefix",
            "must not be empty",
        ));
    } else if prefix.contains([';', '=']) {
        errors.push(ValidationError::new(
            "reflector.storage_prefix",
            format!("`{prefix}` must not contain `;` or `=`"),
        ));
    }

    if config.observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level `{}`", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = RouterConfig::default();
        config.router.history_limit = 0;
        config.reflector.storage_prefix = "a;b".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "router.history_limit",
                "reflector.storage_prefix",
                "observability.log_level"
            ]
        );
    }
}
