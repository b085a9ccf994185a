//! Folder-grouped and hierarchical views over graph nodes

use crate::graph::IncludeGraph;
use crate::model::{FolderTreeNode, NodeId};
use crate::paths;
use std::collections::HashSet;
use std::fmt::Write;

/// Folder name used for nodes whose identity is not a rooted path.
pub const UNRESOLVED_FOLDER: &str = "<unresolved>";

struct SortedLeaf<'a> {
    id: NodeId,
    identity: &'a str,
    folder: Vec<&'a str>,
}

/// Group `nodes` into a tree mirroring their folder structure.
///
/// `exclude` removes one node, usually the file the view is built for.
/// Unresolved nodes are collected in a leading [`UNRESOLVED_FOLDER`] folder.
pub fn group_by_folder(
    graph: &IncludeGraph,
    nodes: impl IntoIterator<Item = NodeId>,
    exclude: Option<NodeId>,
) -> FolderTreeNode {
    let mut unresolved = Vec::new();
    let mut rooted = Vec::new();

    for id in nodes {
        if Some(id) == exclude {
            continue;
        }
        let Some(node) = graph.node(id) else {
            continue;
        };
        if node.is_resolved() {
            rooted.push(SortedLeaf {
                id,
                identity: &node.identity,
                folder: paths::folder_segments(&node.identity),
            });
        } else {
            unresolved.push(FolderTreeNode::Leaf(id));
        }
    }

    rooted.sort_by(|a, b| a.folder.cmp(&b.folder).then_with(|| a.identity.cmp(b.identity)));

    let mut children = Vec::new();
    if !unresolved.is_empty() {
        children.push(FolderTreeNode::Folder {
            path: UNRESOLVED_FOLDER.to_string(),
            children: unresolved,
        });
    }
    children.extend(group_range(&rooted, 0));

    FolderTreeNode::Root { children }
}

/// Groups a sorted range whose items all share the first `known` folder segments.
fn group_range(items: &[SortedLeaf<'_>], known: usize) -> Vec<FolderTreeNode> {
    let mut out = Vec::new();
    let mut begin = 0;

    while begin < items.len() {
        let first = &items[begin].folder;
        if first.len() <= known {
            out.push(FolderTreeNode::Leaf(items[begin].id));
            begin += 1;
            continue;
        }

        let candidate = first[known];
        let end = begin
            + items[begin..]
                .iter()
                .take_while(|item| item.folder.len() > known && item.folder[known] == candidate)
                .count();
        let run = &items[begin..end];

        let prefix_len = run
            .iter()
            .map(|item| common_prefix_len(first, &item.folder))
            .min()
            .unwrap_or(known + 1);

        let direct = run.iter().take_while(|item| item.folder.len() == prefix_len).count();
        let mut children: Vec<_> = run[..direct].iter().map(|item| FolderTreeNode::Leaf(item.id)).collect();
        children.extend(group_range(&run[direct..], prefix_len));

        out.push(FolderTreeNode::Folder {
            path: paths::join_segments(&first[..prefix_len]),
            children,
        });
        begin = end;
    }

    out
}

fn common_prefix_len(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Render a folder tree as indented text, one entry per line.
pub fn render_folder_tree(graph: &IncludeGraph, tree: &FolderTreeNode) -> String {
    let mut out = String::new();
    for child in tree.children() {
        render_folder_node(graph, child, 0, &mut out);
    }
    out
}

fn render_folder_node(graph: &IncludeGraph, item: &FolderTreeNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match item {
        FolderTreeNode::Leaf(id) => {
            let name = graph.node(*id).map_or("?", |n| n.display_name.as_str());
            let _ = writeln!(out, "{}{}", indent, name);
        }
        FolderTreeNode::Folder { path, children } => {
            let _ = writeln!(out, "{}[{}]", indent, path);
            for child in children {
                render_folder_node(graph, child, depth + 1, out);
            }
        }
        FolderTreeNode::Root { children } => {
            for child in children {
                render_folder_node(graph, child, depth, out);
            }
        }
    }
}

/// Render the include hierarchy below `root`.
///
/// Each file's includes are listed once; later occurrences are marked with
/// `(repeated)` and not expanded again, which also terminates cycles.
pub fn render_include_tree(graph: &IncludeGraph, root: NodeId) -> String {
    let mut out = String::new();
    let mut expanded = HashSet::new();
    render_include_node(graph, root, 0, &mut expanded, &mut out);
    out
}

fn render_include_node(
    graph: &IncludeGraph,
    id: NodeId,
    depth: usize,
    expanded: &mut HashSet<NodeId>,
    out: &mut String,
) {
    let Some(node) = graph.node(id) else {
        return;
    };
    let includes = graph.includes_of(id);
    let indent = "  ".repeat(depth);

    if !expanded.insert(id) && !includes.is_empty() {
        let _ = writeln!(out, "{}{} (repeated)", indent, node.display_name);
        return;
    }
    let _ = writeln!(out, "{}{}", indent, node.display_name);

    for edge in includes {
        render_include_node(graph, edge.target, depth + 1, expanded, out);
    }
}
