//! Path segment tree
//!
//! Every node stands for one `/`-delimited segment of a registered pattern and
//! holds the handlers registered for that exact path, keyed by method.
//!
//! # Design Decisions
//! - Children keep insertion order; the first matching child wins
//! - Literal siblings are never duplicated
//! - Parameter siblings with different names are kept apart, but a request
//!   walk takes any parameter child as a match, so only the first one at a
//!   given depth can ever be reached
//! - Nodes are only appended, never removed, so a built tree can be read
//!   concurrently without locks

use std::borrow::Cow;
use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use super::method::Method;
use super::params::Params;
use crate::error::RouterError;

/// Path separator; also the segment text of the root node.
pub const SEPARATOR: char = '/';

/// Leading marker of a capturing segment, as in `/users/:id`.
pub const PARAM_MARKER: char = ':';

/// Split a path into its non-empty segments.
///
/// Patterns and request paths go through the same split, so `/users/`
/// resolves like `/users` instead of offering an empty segment to `:id`.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Percent-decode one request segment.
///
/// Runs after splitting, so an escaped `%2F` stays inside its segment. A
/// segment that does not decode to UTF-8 is kept as sent.
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(segment))
}

/// One segment of the route tree.
#[derive(Debug)]
pub struct Node<H> {
    segment: String,
    is_param: bool,
    children: Vec<Node<H>>,
    handlers: HashMap<Method, H>,
}

/// Outcome of walking the tree for a concrete request path.
#[derive(Debug)]
pub struct Resolution<'t, 'p, H> {
    /// Deepest node actually reached.
    pub node: &'t Node<H>,
    /// First segment no child matched; `None` when the whole path was consumed.
    pub unmatched: Option<&'p str>,
}

impl<'t, 'p, H> Resolution<'t, 'p, H> {
    /// Handler for `method`, only if the full path resolved to this node.
    pub fn handler(&self, method: Method) -> Option<&'t H> {
        if self.unmatched.is_some() {
            return None;
        }
        self.node.handler(method)
    }
}

impl<H> Default for Node<H> {
    fn default() -> Self {
        Self::root()
    }
}

impl<H> Node<H> {
    /// Root of an empty tree.
    pub fn root() -> Self {
        Self::new(&SEPARATOR.to_string())
    }

    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            is_param: segment.starts_with(PARAM_MARKER),
            children: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub const fn is_param(&self) -> bool {
        self.is_param
    }

    /// Captured name of a parameter node, without the marker.
    pub fn param_name(&self) -> Option<&str> {
        if self.is_param {
            self.segment.strip_prefix(PARAM_MARKER)
        } else {
            None
        }
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub fn handler(&self, method: Method) -> Option<&H> {
        self.handlers.get(&method)
    }

    /// Methods registered on this node, in a stable order.
    pub fn methods(&self) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|m| self.handlers.contains_key(m))
            .collect()
    }

    /// Register `handler` for `method` on `pattern`.
    ///
    /// Each round walks the tree from this node with the whole pattern. If the
    /// walk consumes every segment the node already exists and the handler is
    /// attached there, replacing any earlier one for the same method.
    /// Otherwise one node is appended for the first unmatched segment and the
    /// walk starts over.
    pub fn insert(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), RouterError> {
        if !pattern.starts_with(SEPARATOR) {
            return Err(RouterError::InvalidPattern(pattern.to_string()));
        }
        let segments = split_path(pattern);

        loop {
            let path = self.locate(&segments);
            let depth = path.len();
            let node = self.descend_mut(&path);

            if depth == segments.len() {
                node.handlers.insert(method, handler);
                return Ok(());
            }
            node.children.push(Self::new(segments[depth]));
        }
    }

    /// Child indices along the longest registered prefix of `segments`.
    ///
    /// Pattern segments are compared by text, so `:id` only follows an `:id`
    /// node and a literal never follows a parameter node.
    fn locate(&self, segments: &[&str]) -> Vec<usize> {
        let mut path = Vec::with_capacity(segments.len());
        let mut node = self;
        for segment in segments {
            let Some(index) = node.children.iter().position(|c| c.segment == *segment) else {
                break;
            };
            path.push(index);
            node = &node.children[index];
        }
        path
    }

    fn descend_mut(&mut self, path: &[usize]) -> &mut Self {
        let mut node = self;
        for &index in path {
            node = &mut node.children[index];
        }
        node
    }

    /// Walk the tree for a concrete request path.
    ///
    /// At each depth the first child whose literal text equals the segment, or
    /// any parameter child, is taken. Parameter captures are appended to
    /// `params` when a collector is supplied. When no child matches, the walk
    /// stops at the current node and reports the segment it could not place.
    pub fn resolve<'t, 'p>(
        &'t self,
        segments: &[&'p str],
        mut params: Option<&mut Params>,
    ) -> Resolution<'t, 'p, H> {
        let mut node = self;
        for &segment in segments {
            let Some(child) = node
                .children
                .iter()
                .find(|c| c.is_param || c.segment == segment)
            else {
                return Resolution {
                    node,
                    unmatched: Some(segment),
                };
            };
            if let (Some(name), Some(params)) = (child.param_name(), params.as_deref_mut()) {
                params.add(name, segment);
            }
            node = child;
        }
        Resolution {
            node,
            unmatched: None,
        }
    }

    /// Every `(method, pattern)` reachable from this node, depth first.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut out = Vec::new();
        self.collect_routes(String::new(), &mut out);
        out
    }

    fn collect_routes(&self, prefix: String, out: &mut Vec<(Method, String)>) {
        let pattern = if prefix.is_empty() {
            SEPARATOR.to_string()
        } else {
            prefix.clone()
        };
        out.extend(self.methods().into_iter().map(|m| (m, pattern.clone())));
        for child in &self.children {
            child.collect_routes(format!("{prefix}{SEPARATOR}{}", child.segment), out);
        }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// True when this node or any node below it carries a handler.
    pub fn has_routes(&self) -> bool {
        !self.handlers.is_empty() || self.children.iter().any(Self::has_routes)
    }
}
