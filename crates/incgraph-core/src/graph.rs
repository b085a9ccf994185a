//! Include graph wrapper using petgraph::StableDiGraph with an identity index

use crate::model::*;
use crate::paths;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use std::path::Path;

/// The include graph: one node per file identity, one edge per include directive.
///
/// Nodes and edges are never removed, so ids stay dense and edge ids reflect
/// insertion order.
pub struct IncludeGraph {
    inner: StableDiGraph<GraphNode, IncludeEdge>,
    by_identity: HashMap<String, NodeId>,
}

impl std::fmt::Debug for IncludeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncludeGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl IncludeGraph {
    pub fn new() -> Self {
        IncludeGraph {
            inner: StableDiGraph::new(),
            by_identity: HashMap::new(),
        }
    }

    /// Get or create the node for a file. The identity is canonicalized first.
    ///
    /// Returns the node and whether it was created by this call.
    pub fn create_or_get(&mut self, identity: &str) -> (NodeId, bool) {
        let canonical = paths::canonical_identity(Path::new(identity));
        self.create_or_get_canonical(&canonical)
    }

    /// Get or create a node for an identity that is already canonical, or a raw
    /// unresolved include spec that must be kept verbatim.
    pub fn create_or_get_canonical(&mut self, identity: &str) -> (NodeId, bool) {
        if let Some(&id) = self.by_identity.get(identity) {
            return (id, false);
        }

        let idx = self.inner.add_node(GraphNode::new(NodeId::default(), identity));
        let id = NodeId(idx.index() as u64);
        self.inner[idx].id = id;
        self.by_identity.insert(identity.to_string(), id);
        (id, true)
    }

    /// Append an include edge. Edges are kept even if the same pair already exists.
    pub fn add_include(&mut self, source: NodeId, target: NodeId, line: Option<IncludeLine>) -> EdgeId {
        let idx = self.inner.add_edge(
            Self::index(source),
            Self::index(target),
            IncludeEdge {
                id: EdgeId::default(),
                source,
                target,
                line,
            },
        );
        let id = EdgeId(idx.index() as u64);
        self.inner[idx].id = id;
        id
    }

    /// Look up a node by identity without creating it. The identity is canonicalized.
    pub fn find(&self, identity: &str) -> Option<NodeId> {
        self.by_identity
            .get(identity)
            .or_else(|| self.by_identity.get(&paths::canonical_identity(Path::new(identity))))
            .copied()
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.inner.node_weight(Self::index(id))
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in creation order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all node ids in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.node_indices().map(|idx| NodeId(idx.index() as u64))
    }

    /// Outgoing include edges of a node, in the order they were added.
    pub fn includes_of(&self, source: NodeId) -> Vec<&IncludeEdge> {
        self.edges_directed(source, Direction::Outgoing)
    }

    /// Incoming include edges of a node, in the order they were added.
    pub fn includers_of(&self, target: NodeId) -> Vec<&IncludeEdge> {
        self.edges_directed(target, Direction::Incoming)
    }

    /// Target of the most recently added include of a node.
    pub fn last_include_target(&self, source: NodeId) -> Option<NodeId> {
        self.inner
            .edges_directed(Self::index(source), Direction::Outgoing)
            .max_by_key(|edge_ref| edge_ref.id())
            .map(|edge_ref| edge_ref.weight().target)
    }

    /// Number of nodes whose identity is an unresolved include spec.
    pub fn unresolved_count(&self) -> usize {
        self.all_nodes().filter(|n| !n.is_resolved()).count()
    }

    /// Replace every resolved node's display name with its shortest form
    /// relative to one of `base_dirs`. Nodes without a relative form keep their name.
    pub fn relabel_relative(&mut self, base_dirs: &[String]) {
        for idx in self.inner.node_indices().collect::<Vec<_>>() {
            let node = &mut self.inner[idx];
            if !node.is_resolved() {
                continue;
            }
            let dirs = base_dirs.iter().map(String::as_str);
            if let Some(label) = paths::shortest_relative(&node.identity, dirs, true) {
                node.display_name = label;
            }
        }
    }

    /// Borrow the underlying petgraph structure for graph algorithms.
    pub(crate) fn raw(&self) -> &StableDiGraph<GraphNode, IncludeEdge> {
        &self.inner
    }

    pub(crate) fn index(id: NodeId) -> NodeIndex {
        NodeIndex::new(id.0 as usize)
    }

    fn edges_directed(&self, id: NodeId, direction: Direction) -> Vec<&IncludeEdge> {
        let mut edges: Vec<_> = self
            .inner
            .edges_directed(Self::index(id), direction)
            .map(|edge_ref| (edge_ref.id(), edge_ref.weight()))
            .collect();
        edges.sort_by_key(|(idx, _)| *idx);
        edges.into_iter().map(|(_, edge)| edge).collect()
    }
}

impl Default for IncludeGraph {
    fn default() -> Self {
        Self::new()
    }
}
