//! URL transforms.
//!
//! Transforms translate between the URL a reflector shows to the outside
//! world and the URL the router resolves. `navigate` applies `to_internal`
//! in registration order; reflectors apply `to_external` in reverse order.

use std::fmt;

pub trait UrlTransform: Send + Sync + fmt::Debug {
    fn to_internal(&self, url: &str) -> String {
        url.to_string()
    }

    fn to_external(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Serves the application under a fixed path prefix.
#[derive(Debug, Clone)]
pub struct BasePath {
    base: String,
}

impl BasePath {
    /// `base` is normalized to a leading slash and no trailing slash.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        let trimmed = base.trim_matches('/');
        Self {
            base: if trimmed.is_empty() {
                String::new()
            } else {
                format!("/{}", trimmed)
            },
        }
    }
}

impl UrlTransform for BasePath {
    fn to_internal(&self, url: &str) -> String {
        match url.strip_prefix(&self.base) {
            Some(rest) if rest.is_empty() => "/".to_string(),
            Some(rest) if rest.starts_with(['/', '?', '#']) => {
                if rest.starts_with('/') {
                    rest.to_string()
                } else {
                    format!("/{}", rest)
                }
            }
            _ => url.to_string(),
        }
    }

    fn to_external(&self, url: &str) -> String {
        if url == "/" {
            return if self.base.is_empty() {
                "/".to_string()
            } else {
                self.base.clone()
            };
        }
        format!("{}{}", self.base, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_path() {
        let base = BasePath::new("app/");
        assert_eq!(base.to_internal("/app/users/1"), "/users/1");
        assert_eq!(base.to_internal("/app"), "/");
        assert_eq!(base.to_internal("/app?x=1"), "/?x=1");
        assert_eq!(base.to_internal("/application"), "/application");
        assert_eq!(base.to_external("/users/1"), "/app/users/1");
        assert_eq!(base.to_external("/"), "/app");
    }
}
