//! incgraph core: include graph model, transitive closure, folder grouping and DGML export

pub mod closure;
pub mod dgml;
pub mod folders;
pub mod graph;
pub mod model;
pub mod paths;


#[cfg(test)]
pub mod test_utils;

pub use closure::TransitiveClosure;
pub use dgml::{DgmlGraph, DgmlLink, DgmlNode, GroupState, LinkCategory, ParseColorError, Rgb};
pub use folders::{UNRESOLVED_FOLDER, group_by_folder, render_folder_tree, render_include_tree};
pub use graph::IncludeGraph;
pub use model::{DelimiterKind, EdgeId, FolderTreeNode, GraphNode, IncludeEdge, IncludeLine, NodeId, PRESERVE_MARKER};
