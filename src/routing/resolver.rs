//! Path resolution against the route tree.
//!
//! # Responsibilities
//! - Split a URL path into segments (trailing/double slashes normalized)
//! - Descend the tree segment by segment, literal before dynamic
//! - Bind dynamic segments to params (last writer wins)
//! - Serve the index child when the path ends at an indexed node
//!
//! # Design Decisions
//! - Pure function of (tree, path): no caches, no global state
//! - Backtracks into dynamic siblings when a literal branch dead-ends
//! - A path ending at a non-leaf, non-indexed node is not a match

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::routing::node::{RouteNode, Segment};

/// Successful resolution: matched chain (outer → inner) and bound params.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub nodes: Vec<Arc<RouteNode>>,
    pub params: BTreeMap<String, String>,
}

impl Resolution {
    /// The deepest matched node.
    pub fn leaf(&self) -> &Arc<RouteNode> {
        // The chain always starts with the resolution root.
        &self.nodes[self.nodes.len() - 1]
    }
}

/// No leaf of the tree matches the path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no route matches path `{path}`")]
pub struct NoMatchError {
    pub path: String,
}

#[derive(Clone, Copy)]
enum Terminal {
    /// Path must end on a leaf or an indexed node.
    Leaf,
    /// Path may end anywhere.
    Any,
}

/// Resolve `path` starting at `root`.
pub fn resolve(root: &Arc<RouteNode>, path: &str) -> Result<Resolution, NoMatchError> {
    let segments = split_path(path);
    let mut nodes = vec![root.clone()];
    let mut params = BTreeMap::new();

    if descend(root, &segments, &mut nodes, &mut params, Terminal::Leaf) {
        Ok(Resolution { nodes, params })
    } else {
        Err(NoMatchError {
            path: path.to_string(),
        })
    }
}

/// Find the node `path` leads to without requiring a leaf.
pub(crate) fn locate(root: &Arc<RouteNode>, path: &str) -> Option<Arc<RouteNode>> {
    let segments = split_path(path);
    let mut nodes = vec![root.clone()];
    let mut params = BTreeMap::new();

    if descend(root, &segments, &mut nodes, &mut params, Terminal::Any) {
        nodes.pop()
    } else {
        None
    }
}

/// Path component only: query and fragment dropped, empty segments skipped.
pub(crate) fn split_path(url: &str) -> Vec<&str> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Whether two URLs address the same location once empty path segments and
/// trailing slashes are dropped. Query and fragment must match exactly.
pub fn same_location(a: &str, b: &str) -> bool {
    fn tail(url: &str) -> &str {
        url.find(['?', '#']).map_or("", |at| &url[at..])
    }
    split_path(a) == split_path(b) && tail(a) == tail(b)
}

fn descend(
    node: &Arc<RouteNode>,
    segments: &[&str],
    nodes: &mut Vec<Arc<RouteNode>>,
    params: &mut BTreeMap<String, String>,
    terminal: Terminal,
) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return match terminal {
            Terminal::Any => true,
            Terminal::Leaf => match node.index_child() {
                Some(index) => {
                    nodes.push(index.clone());
                    true
                }
                None => node.is_leaf(),
            },
        };
    };

    let literal = node
        .children()
        .iter()
        .find(|child| matches!(child.segment(), Segment::Literal(name) if name == head));
    if let Some(child) = literal {
        nodes.push(child.clone());
        if descend(child, rest, nodes, params, terminal) {
            return true;
        }
        nodes.pop();
    }

    for child in node.children() {
        let Segment::Dynamic(name) = child.segment() else {
            continue;
        };
        let previous = params.insert(name.clone(), head.to_string());
        nodes.push(child.clone());
        if descend(child, rest, nodes, params, terminal) {
            return true;
        }
        nodes.pop();
        match previous {
            Some(value) => params.insert(name.clone(), value),
            None => params.remove(name),
        };
    }

    false
}
