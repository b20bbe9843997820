//! Route nodes.
//!
//! # Responsibilities
//! - Represent one path segment (literal or dynamic)
//! - Carry per-node metadata: guards, preload, lazy component, decorators
//! - Designate an index child served when a path ends at this node
//! - Validate sibling uniqueness when the tree is frozen

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::route::{LoadResult, Route};
use crate::routing::resolver::{self, NoMatchError, Resolution};
use crate::BoxError;

/// A loaded component, opaque to the routing core.
pub type Component = Arc<dyn Any + Send + Sync>;

/// Predicate that may veto a navigation.
pub type Guard = Arc<dyn Fn(Arc<Route>) -> BoxFuture<'static, Result<bool, BoxError>> + Send + Sync>;

/// Data fetcher run once every guard has passed.
pub type Preload =
    Arc<dyn Fn(Arc<Route>) -> BoxFuture<'static, Result<LoadResult, BoxError>> + Send + Sync>;

/// Lazy component reference.
pub type ComponentLoader =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Component, BoxError>> + Send + Sync>;

/// Pattern of a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches the path segment exactly.
    Literal(String),
    /// Matches any path segment and binds it to the named param.
    Dynamic(String),
}

impl Segment {
    /// Parse a raw segment. `[id]` and `:id` are dynamic, anything else is literal.
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(':') {
            return Segment::Dynamic(name.to_string());
        }
        match raw.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            Some(name) => Segment::Dynamic(name.to_string()),
            None => Segment::Literal(raw.to_string()),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Segment::Dynamic(_))
    }

    /// Name of the bound param, for dynamic segments.
    pub fn param(&self) -> Option<&str> {
        match self {
            Segment::Dynamic(name) => Some(name),
            Segment::Literal(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(name) => f.write_str(name),
            Segment::Dynamic(name) => write!(f, ":{}", name),
        }
    }
}

/// One node of the static route tree.
///
/// Built with the consuming builder methods, then frozen by [`RouteTree::new`].
pub struct RouteNode {
    segment: Segment,
    children: Vec<Arc<RouteNode>>,
    index: Option<usize>,
    guards: Vec<Guard>,
    preload: Option<Preload>,
    component: Option<ComponentLoader>,
    decorators: Vec<String>,
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("segment", &self.segment)
            .field("children", &self.children)
            .field("index", &self.index)
            .field("guards", &self.guards.len())
            .field("has_preload", &self.preload.is_some())
            .field("has_component", &self.component.is_some())
            .field("decorators", &self.decorators)
            .finish()
    }
}

impl RouteNode {
    fn with_segment(segment: Segment) -> Self {
        Self {
            segment,
            children: Vec::new(),
            index: None,
            guards: Vec::new(),
            preload: None,
            component: None,
            decorators: Vec::new(),
        }
    }

    /// The tree root. It consumes no path segment.
    pub fn root() -> Self {
        Self::with_segment(Segment::Literal(String::new()))
    }

    pub fn literal(name: impl Into<String>) -> Self {
        Self::with_segment(Segment::Literal(name.into()))
    }

    pub fn dynamic(param: impl Into<String>) -> Self {
        Self::with_segment(Segment::Dynamic(param.into()))
    }

    /// Build a node from a raw segment (`"about"`, `":id"`, `"[id]"`).
    pub fn parse(raw: &str) -> Self {
        Self::with_segment(Segment::parse(raw))
    }

    pub fn child(mut self, child: RouteNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Add the designated index child, used when the path ends at this node.
    pub fn index(mut self, child: RouteNode) -> Self {
        self.index = Some(self.children.len());
        self.children.push(Arc::new(child));
        self
    }

    pub fn guard<F, Fut>(mut self, guard: F) -> Self
    where
        F: Fn(Arc<Route>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
    {
        self.guards.push(Arc::new(move |route| guard(route).boxed()));
        self
    }

    pub fn preload<F, Fut>(mut self, preload: F) -> Self
    where
        F: Fn(Arc<Route>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<LoadResult, BoxError>> + Send + 'static,
    {
        self.preload = Some(Arc::new(move |route| preload(route).boxed()));
        self
    }

    pub fn component<F, Fut>(mut self, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Component, BoxError>> + Send + 'static,
    {
        self.component = Some(Arc::new(move || loader().boxed()));
        self
    }

    pub fn decorator(mut self, name: impl Into<String>) -> Self {
        self.decorators.push(name.into());
        self
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn children(&self) -> &[Arc<RouteNode>] {
        &self.children
    }

    pub fn index_child(&self) -> Option<&Arc<RouteNode>> {
        self.index.and_then(|i| self.children.get(i))
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    pub fn preload_fn(&self) -> Option<&Preload> {
        self.preload.as_ref()
    }

    pub fn component_loader(&self) -> Option<&ComponentLoader> {
        self.component.as_ref()
    }

    pub fn decorators(&self) -> &[String] {
        &self.decorators
    }
}

/// Error raised when freezing an invalid tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("duplicate segment `{segment}` under `{parent}`")]
    DuplicateSegment { parent: String, segment: String },
}

/// The frozen route tree. Read-only after construction and freely shared.
#[derive(Debug, Clone)]
pub struct RouteTree {
    root: Arc<RouteNode>,
}

impl RouteTree {
    /// Freeze a tree, checking that siblings carry pairwise-distinct patterns.
    pub fn new(root: RouteNode) -> Result<Self, TreeError> {
        validate(&root, "/")?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    pub fn root(&self) -> &Arc<RouteNode> {
        &self.root
    }

    /// Resolve a path from the tree root.
    pub fn resolve(&self, path: &str) -> Result<Resolution, NoMatchError> {
        resolver::resolve(&self.root, path)
    }

    /// Find the node a path leads to, whether or not it is a leaf.
    pub fn find(&self, path: &str) -> Option<Arc<RouteNode>> {
        resolver::locate(&self.root, path)
    }
}

fn validate(node: &RouteNode, path: &str) -> Result<(), TreeError> {
    let mut seen = HashSet::new();
    for child in &node.children {
        if !seen.insert(&child.segment) {
            return Err(TreeError::DuplicateSegment {
                parent: path.to_string(),
                segment: child.segment.to_string(),
            });
        }
        let child_path = format!("{}{}/", path, child.segment);
        validate(child, &child_path)?;
    }
    Ok(())
}
