//! Declarative route manifests.
//!
//! A manifest is the static description of a route tree handed to the
//! runtime by whatever scanned the application's pages. It is read from
//! TOML or JSON depending on the file extension.
//!
//! ```toml
//! segment = ""
//! index = "index"
//!
//! [[children]]
//! segment = "index"
//!
//! [[children]]
//! segment = "posts"
//! decorators = ["layout"]
//!
//! [[children.children]]
//! segment = "[slug]"
//! load = { status = 200, maxage = 60, props = { kind = "post" } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::route::LoadResult;
use crate::routing::node::{RouteNode, RouteTree, TreeError};
use crate::BoxError;

/// Error type for manifest loading.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("index `{index}` is not a child of `{parent}`")]
    MissingIndex { parent: String, index: String },
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// One node of a manifest.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NodeManifest {
    /// Raw segment: `"about"`, `"[id]"` or `":id"`. Empty for the root.
    pub segment: String,

    /// Name of the child served when the path ends at this node.
    pub index: Option<String>,

    pub decorators: Vec<String>,

    /// Static data returned by this node's preload.
    pub load: Option<LoadResult>,

    pub children: Vec<NodeManifest>,
}

impl NodeManifest {
    /// Build the node and its subtree.
    pub fn into_node(self) -> Result<RouteNode, ManifestError> {
        let NodeManifest {
            segment,
            index,
            decorators,
            load,
            children,
        } = self;

        let mut node = RouteNode::parse(&segment);
        for decorator in decorators {
            node = node.decorator(decorator);
        }
        if let Some(load) = load {
            node = node.preload(move |_route| {
                let load = load.clone();
                async move { Ok::<_, BoxError>(load) }
            });
        }

        let mut index_found = false;
        for child in children {
            let is_index = index.as_deref() == Some(child.segment.as_str());
            let child = child.into_node()?;
            node = if is_index {
                index_found = true;
                node.index(child)
            } else {
                node.child(child)
            };
        }

        match index {
            Some(index) if !index_found => Err(ManifestError::MissingIndex {
                parent: segment,
                index,
            }),
            _ => Ok(node),
        }
    }

    pub fn into_tree(self) -> Result<RouteTree, ManifestError> {
        Ok(RouteTree::new(self.into_node()?)?)
    }
}

/// Load a route tree from a `.toml` or `.json` manifest.
pub fn load_manifest(path: &Path) -> Result<RouteTree, ManifestError> {
    let content = fs::read_to_string(path)?;
    let manifest: NodeManifest = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => toml::from_str(&content)?,
    };

    let tree = manifest.into_tree()?;
    tracing::debug!(path = ?path, "Route manifest loaded");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::node::Segment;

    const MANIFEST: &str = r#"
        index = "index"

        [[children]]
        segment = "index"

        [[children]]
        segment = "posts"
        decorators = ["layout"]

        [[children.children]]
        segment = "[slug]"
        load = { status = 200, maxage = 60, props = { kind = "post" } }
    "#;

    #[test]
    fn test_toml_manifest() {
        let manifest: NodeManifest = toml::from_str(MANIFEST).unwrap();
        let tree = manifest.into_tree().unwrap();

        let r = tree.resolve("/posts/hello").unwrap();
        assert_eq!(r.params.get("slug").map(String::as_str), Some("hello"));
        assert_eq!(r.nodes[1].decorators(), ["layout".to_string()]);
        assert!(r.leaf().preload_fn().is_some());

        let r = tree.resolve("/").unwrap();
        assert_eq!(r.leaf().segment(), &Segment::Literal("index".into()));
    }

    #[test]
    fn test_missing_index() {
        let manifest = NodeManifest {
            segment: "docs".into(),
            index: Some("index".into()),
            ..Default::default()
        };
        assert!(matches!(
            manifest.into_node(),
            Err(ManifestError::MissingIndex { .. })
        ));
    }

    #[test]
    fn test_json_file() {
        let path = std::env::temp_dir().join(format!("route_manifest_{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{ "children": [ { "segment": "about" }, { "segment": ":id" } ] }"#,
        )
        .unwrap();

        let tree = load_manifest(&path).unwrap();
        assert!(tree.resolve("/about").is_ok());
        assert!(tree.resolve("/7").is_ok());

        fs::remove_file(&path).unwrap_or_default();
    }
}
