//! Transitive include counts over a possibly cyclic graph
//!
//! Nodes in one strongly connected component reach exactly the same set of
//! files, so the closure keeps one set per component and every member shares it.

use crate::graph::IncludeGraph;
use crate::model::NodeId;
use petgraph::algo::tarjan_scc;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Reachability sets for every node of a graph, computed once.
#[derive(Debug, Default)]
pub struct TransitiveClosure {
    set_of: HashMap<NodeId, usize>,
    sets: Vec<BTreeSet<NodeId>>,
}

impl TransitiveClosure {
    pub fn compute(graph: &IncludeGraph) -> Self {
        let raw = graph.raw();
        let to_id = |idx: petgraph::stable_graph::NodeIndex| NodeId(idx.index() as u64);

        // Components arrive sinks first, so successor sets are always complete.
        let components = tarjan_scc(raw);
        let mut closure = TransitiveClosure {
            set_of: HashMap::with_capacity(graph.node_count()),
            sets: Vec::with_capacity(components.len()),
        };

        for component in &components {
            let handle = closure.sets.len();
            for &idx in component {
                closure.set_of.insert(to_id(idx), handle);
            }

            let mut reached = BTreeSet::new();
            for &idx in component {
                for target in raw.neighbors(idx) {
                    let target_id = to_id(target);
                    reached.insert(target_id);
                    if let Some(&other) = closure.set_of.get(&target_id) {
                        if other != handle {
                            reached.extend(closure.sets[other].iter().copied());
                        }
                    }
                }
            }
            closure.sets.push(reached);
        }

        debug!(
            "Computed closure: {} nodes in {} components",
            graph.node_count(),
            closure.sets.len()
        );
        closure
    }

    /// Every file reachable from `node` through one or more includes, without `node` itself.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.set_for(node)
            .into_iter()
            .flatten()
            .copied()
            .filter(move |&id| id != node)
    }

    pub fn descendant_count(&self, node: NodeId) -> usize {
        match self.set_for(node) {
            Some(set) => set.len() - usize::from(set.contains(&node)),
            None => 0,
        }
    }

    /// Largest descendant count over all nodes, 0 for an empty graph.
    pub fn max_descendant_count(&self) -> usize {
        self.set_of
            .keys()
            .map(|&id| self.descendant_count(id))
            .max()
            .unwrap_or(0)
    }

    fn set_for(&self, node: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.set_of.get(&node).map(|&handle| &self.sets[handle])
    }
}
