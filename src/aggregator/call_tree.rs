//! Prefix tree of attributed call paths.
//!
//! Paths are inserted outermost frame first below a synthetic root. A node's
//! count is the number of samples whose kept path passes through it, so a
//! parent always has at least as many samples as all of its children
//! together.

use super::frame_key::FrameKey;
use crate::utils::error::AnalysisError;
use std::collections::HashMap;

/// One call path element
#[derive(Debug, Clone)]
pub struct Node {
    key: FrameKey,
    count: u64,
    children: HashMap<FrameKey, Node>,
}

impl Node {
    fn new(key: FrameKey) -> Self {
        Self {
            key,
            count: 0,
            children: HashMap::new(),
        }
    }

    pub fn key(&self) -> &FrameKey {
        &self.key
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn child(&self, key: &str) -> Option<&Node> {
        self.children.get(key)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Sum of the direct children's counts
    pub fn children_total(&self) -> u64 {
        self.children.values().map(|c| c.count).sum()
    }

    /// Children by count descending, ties by key ascending
    pub fn ordered_children(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.children.values().collect();
        nodes.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        nodes
    }

    fn record_child_samples(&mut self, key: FrameKey, weight: u64) -> &mut Node {
        let child = self
            .children
            .entry(key)
            .or_insert_with_key(|key| Node::new(key.clone()));
        child.count += weight;
        child
    }
}

/// Call tree rooted at a synthetic, never-counted root
#[derive(Debug, Clone)]
pub struct CallTree {
    root: Node,
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CallTree {
    pub fn new() -> Self {
        Self {
            root: Node::new(FrameKey::root()),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Record one sample's path, outermost frame first
    ///
    /// **Public** - main entry point for aggregation
    pub fn insert<I>(&mut self, path: I)
    where
        I: IntoIterator<Item = FrameKey>,
    {
        self.insert_weighted(path, 1);
    }

    /// Record `weight` identical samples sharing one path
    pub fn insert_weighted<I>(&mut self, path: I, weight: u64)
    where
        I: IntoIterator<Item = FrameKey>,
    {
        if weight == 0 {
            return;
        }

        let mut node = &mut self.root;
        for key in path {
            node = node.record_child_samples(key, weight);
        }
    }

    /// Samples recorded in the tree
    pub fn attributed_samples(&self) -> u64 {
        self.root.children_total()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Number of nodes, root excluded
    pub fn node_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            node.children.values().map(|c| 1 + count(c)).sum()
        }
        count(&self.root)
    }

    /// Length of the longest recorded path
    pub fn max_depth(&self) -> usize {
        fn depth(node: &Node) -> usize {
            node.children
                .values()
                .map(|c| 1 + depth(c))
                .max()
                .unwrap_or(0)
        }
        depth(&self.root)
    }

    /// Depth-first walk in report order; the root is not visited
    ///
    /// `visit` receives the depth (0 for the root's children) and the node.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &Node),
    {
        for child in self.root.ordered_children() {
            walk_node(child, 0, &mut visit);
        }
    }

    /// Check that no node's children outnumber it
    pub fn verify(&self) -> Result<(), AnalysisError> {
        let mut path = Vec::new();
        for child in self.root.children.values() {
            verify_node(child, &mut path)?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }
}

fn walk_node<F>(node: &Node, depth: usize, visit: &mut F)
where
    F: FnMut(usize, &Node),
{
    visit(depth, node);
    for child in node.ordered_children() {
        walk_node(child, depth + 1, visit);
    }
}

fn verify_node<'a>(node: &'a Node, path: &mut Vec<&'a str>) -> Result<(), AnalysisError> {
    path.push(node.key.as_str());

    let children = node.children_total();
    if children > node.count {
        return Err(AnalysisError::InvariantViolation {
            path: path.join(" > "),
            count: node.count,
            children,
        });
    }

    for child in node.children.values() {
        verify_node(child, path)?;
    }

    path.pop();
    Ok(())
}
