//! Test utilities for incgraph

use crate::graph::IncludeGraph;
use crate::model::NodeId;
use std::fs;
use tempfile::TempDir;

/// Create a temporary directory tree from `(relative path, content)` pairs.
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}

/// Build an in-memory graph from identity pairs, creating nodes on first mention.
pub fn graph_from_edges(edges: &[(&str, &str)]) -> (IncludeGraph, Vec<NodeId>) {
    let mut graph = IncludeGraph::new();
    let mut ids = Vec::new();

    for (source, target) in edges {
        let (source, new_source) = graph.create_or_get_canonical(source);
        if new_source {
            ids.push(source);
        }
        let (target, new_target) = graph.create_or_get_canonical(target);
        if new_target {
            ids.push(target);
        }
        graph.add_include(source, target, None);
    }

    (graph, ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_repo_with_structure() {
        let temp_dir = create_repo_with_structure(&[("src/main.cpp", "int main() {}"), ("include/a.h", "")]);
        let root = temp_dir.path();

        assert!(root.join("src/main.cpp").exists());
        assert!(root.join("include/a.h").exists());
    }

    #[test]
    fn test_graph_from_edges() {
        let (graph, ids) = graph_from_edges(&[("/a.cpp", "/b.h"), ("/a.cpp", "/c.h"), ("/b.h", "/c.h")]);
        assert_eq!(ids.len(), 3);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
    }
}
