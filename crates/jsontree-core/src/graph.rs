//! Graph wrapper using petgraph::DiGraph keyed by canonical path

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::layout::bounds_of;
use crate::model::*;

/// The JSON graph: a tree of values rooted at the empty path.
///
/// Built wholesale by [`GraphBuilder`](crate::GraphBuilder) and never patched
/// afterwards. Nodes are stored in walk (pre-order) order.
#[derive(Clone)]
pub struct Graph {
    inner: DiGraph<GraphNode, GraphEdge>,
    index: HashMap<String, NodeIndex>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    /// An empty graph, shown before any document is loaded.
    pub fn new() -> Self {
        Graph {
            inner: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    pub(crate) fn with_capacity(nodes: usize) -> Self {
        Graph {
            inner: DiGraph::with_capacity(nodes, nodes.saturating_sub(1)),
            index: HashMap::with_capacity(nodes),
        }
    }

    pub(crate) fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        idx
    }

    pub(crate) fn add_edge(&mut self, source: NodeIndex, target: NodeIndex) {
        let edge = GraphEdge::between(&self.inner[source].id, &self.inner[target].id);
        self.inner.add_edge(source, target, edge);
    }

    /// Get a node by canonical path string.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| &self.inner[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The root node, if a document is loaded.
    pub fn root(&self) -> Option<&GraphNode> {
        self.node("")
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over all nodes in walk order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner.raw_nodes().iter().map(|n| &n.weight)
    }

    /// Iterate over all edges in walk order of their targets.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner.raw_edges().iter().map(|e| &e.weight)
    }

    /// Direct children of a node, in document order.
    pub fn children(&self, id: &str) -> Vec<&GraphNode> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        // petgraph yields outgoing edges newest first.
        let mut targets: Vec<NodeIndex> = self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.target())
            .collect();
        targets.sort();
        targets.into_iter().map(|t| &self.inner[t]).collect()
    }

    pub fn parent(&self, id: &str) -> Option<&GraphNode> {
        let &idx = self.index.get(id)?;
        self.inner
            .edges_directed(idx, Direction::Incoming)
            .next()
            .map(|e| &self.inner[e.source()])
    }

    /// Ancestors of a node, nearest first, ending at the root.
    pub fn ancestors(&self, id: &str) -> Vec<&GraphNode> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            ancestors.push(node);
            current = self.parent(&node.id);
        }
        ancestors
    }

    /// Whether every non-root node has exactly one parent and the root none.
    pub fn is_tree(&self) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.edge_count() + 1 != self.node_count() {
            return false;
        }
        let mut roots = 0;
        for idx in self.inner.node_indices() {
            match self.inner.edges_directed(idx, Direction::Incoming).count() {
                0 => roots += 1,
                1 => {}
                _ => return false,
            }
        }
        roots == 1 && !petgraph::algo::is_cyclic_directed(&self.inner)
    }

    pub fn bounds(&self) -> Bounds {
        bounds_of(self.nodes().map(|n| n.position))
    }

    /// Viewport focus point for a node.
    pub fn focus_point(&self, id: &str) -> Option<Position> {
        self.node(id).map(|n| n.position)
    }

    /// Owned renderer payload.
    pub fn snapshot(&self) -> GraphData {
        GraphData {
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
            bounds: self.bounds(),
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
