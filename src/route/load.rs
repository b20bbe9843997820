//! Preload results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a node's preload hands back to the Route.
///
/// `status`, `redirect` and `maxage` are hints for the rendering layer; when
/// several nodes of a chain set them, the innermost node wins.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoadResult {
    pub props: BTreeMap<String, Value>,
    pub status: Option<u16>,
    pub redirect: Option<String>,
    pub maxage: Option<u64>,
}

impl LoadResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    pub fn with_maxage(mut self, maxage: u64) -> Self {
        self.maxage = Some(maxage);
        self
    }

    /// Layer `inner` over `self`: inner props and hints override outer ones.
    pub fn merge(mut self, inner: &LoadResult) -> Self {
        self.props
            .extend(inner.props.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.status = inner.status.or(self.status);
        self.redirect = inner.redirect.clone().or(self.redirect);
        self.maxage = inner.maxage.or(self.maxage);
        self
    }
}

/// A preload result tagged with the node that produced it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NodeLoad {
    /// Position of the node in the matched chain.
    pub depth: usize,
    pub segment: String,
    pub result: LoadResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_wins() {
        let outer = LoadResult::new()
            .with_prop("title", "Blog")
            .with_prop("section", "posts")
            .with_status(200)
            .with_maxage(30);
        let inner = LoadResult::new().with_prop("title", "Hello").with_status(404);

        let merged = outer.merge(&inner);
        assert_eq!(merged.props["title"], "Hello");
        assert_eq!(merged.props["section"], "posts");
        assert_eq!(merged.status, Some(404));
        assert_eq!(merged.maxage, Some(30));
        assert_eq!(merged.redirect, None);
    }
}
