//! Core data structures for include lines, the include graph and folder trees

use serde::{Deserialize, Serialize};

use crate::paths;

/// Marker that opts a line out of destructive formatting (e.g. duplicate removal).
pub const PRESERVE_MARKER: &str = "$incgraph-preserve$";

/// Stable identifier for a node, an index into the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub u64);

/// Stable identifier for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct EdgeId(pub u64);

/// How the include spec of a line is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelimiterKind {
    /// `#include "foo.h"`
    Quotes,
    /// `#include <foo.h>`
    AngleBrackets,
    /// Not an include line.
    None,
}

impl DelimiterKind {
    fn chars(self) -> Option<(char, char)> {
        match self {
            DelimiterKind::Quotes => Some(('"', '"')),
            DelimiterKind::AngleBrackets => Some(('<', '>')),
            DelimiterKind::None => None,
        }
    }
}

/// A single line of source text plus the include directive found on it, if any.
///
/// Delimiter positions are byte offsets into the raw text. They are either both
/// present with `open < close`, or the line is not an include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawIncludeLine")]
pub struct IncludeLine {
    text: String,
    line_number: usize,
    delimiters: Option<(usize, usize)>,
}

/// Serialized form of [`IncludeLine`]; positions are re-validated on load.
#[derive(Deserialize)]
struct RawIncludeLine {
    text: String,
    line_number: usize,
    delimiters: Option<(usize, usize)>,
}

impl From<RawIncludeLine> for IncludeLine {
    fn from(raw: RawIncludeLine) -> Self {
        match raw.delimiters {
            Some((open, close)) => IncludeLine::with_delimiters(raw.text, raw.line_number, open, close),
            None => IncludeLine::new(raw.text, raw.line_number),
        }
    }
}

impl IncludeLine {
    /// A line without an include directive.
    pub fn new(text: impl Into<String>, line_number: usize) -> Self {
        IncludeLine {
            text: text.into(),
            line_number,
            delimiters: None,
        }
    }

    /// An empty line, used as a separator when reassembling text.
    pub fn blank() -> Self {
        Self::new(String::new(), 0)
    }

    /// A line whose include spec sits between the delimiters at `open` and `close`.
    ///
    /// Falls back to a non-include line if the positions do not describe a
    /// matching delimiter pair.
    pub fn with_delimiters(text: impl Into<String>, line_number: usize, open: usize, close: usize) -> Self {
        let text = text.into();
        let bytes = text.as_bytes();
        let valid = open < close
            && close < bytes.len()
            && matches!((bytes[open], bytes[close]), (b'"', b'"') | (b'<', b'>'));

        IncludeLine {
            text,
            line_number,
            delimiters: valid.then_some((open, close)),
        }
    }

    /// Raw line text, including any edits made through this type.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Zero-based line number in the scanned text.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn delimiter_kind(&self) -> DelimiterKind {
        match self.delimiters {
            Some((open, _)) if self.text.as_bytes()[open] == b'<' => DelimiterKind::AngleBrackets,
            Some(_) => DelimiterKind::Quotes,
            None => DelimiterKind::None,
        }
    }

    /// Whether this line holds an active include directive.
    pub fn is_include(&self) -> bool {
        self.delimiters.is_some()
    }

    /// The include spec between the delimiters, empty for non-include lines.
    pub fn content(&self) -> &str {
        match self.delimiters {
            Some((open, close)) => &self.text[open + 1..close],
            None => "",
        }
    }

    /// The include spec including its delimiters, e.g. `<vector>`.
    pub fn content_with_delimiters(&self) -> &str {
        match self.delimiters {
            Some((open, close)) => &self.text[open..=close],
            None => "",
        }
    }

    /// Replaces the include spec and rewrites the raw text accordingly.
    ///
    /// No effect on non-include lines.
    pub fn set_content(&mut self, content: &str) {
        if let Some((open, close)) = self.delimiters {
            self.text.replace_range(open + 1..close, content);
            self.delimiters = Some((open, open + 1 + content.len()));
        }
    }

    /// Rewrites both delimiter characters. `DelimiterKind::None` has no effect.
    pub fn set_delimiter_kind(&mut self, kind: DelimiterKind) {
        let (Some((open, close)), Some((open_char, close_char))) = (self.delimiters, kind.chars()) else {
            return;
        };
        if self.delimiter_kind() == kind {
            return;
        }
        self.text.replace_range(close..=close, &close_char.to_string());
        self.text.replace_range(open..=open, &open_char.to_string());
    }

    /// Whether the line carries the [`PRESERVE_MARKER`].
    pub fn is_preserved(&self) -> bool {
        self.text.contains(PRESERVE_MARKER)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether the line starts with a preprocessor directive of any kind.
    pub fn is_preprocessor_directive(&self) -> bool {
        self.text.trim_start().starts_with('#')
    }
}

/// A file in the include graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    /// Canonical absolute path, or the raw include spec if resolution failed.
    pub identity: String,
    /// Name used for presentation. Starts out equal to the identity.
    pub display_name: String,
}

impl GraphNode {
    pub fn new(id: NodeId, identity: impl Into<String>) -> Self {
        let identity = identity.into();
        GraphNode {
            id,
            display_name: identity.clone(),
            identity,
        }
    }

    /// Whether the identity is a rooted path rather than a raw unresolved spec.
    pub fn is_resolved(&self) -> bool {
        paths::is_rooted(&self.identity)
    }
}

/// A directed "includes" relationship between two files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncludeEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// The directive this edge came from. Absent for edges ingested from traces.
    pub line: Option<IncludeLine>,
}

/// A node of the folder-grouped view over a set of graph nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderTreeNode {
    Root { children: Vec<FolderTreeNode> },
    Folder { path: String, children: Vec<FolderTreeNode> },
    Leaf(NodeId),
}

impl FolderTreeNode {
    pub fn children(&self) -> &[FolderTreeNode] {
        match self {
            FolderTreeNode::Root { children } | FolderTreeNode::Folder { children, .. } => children,
            FolderTreeNode::Leaf(_) => &[],
        }
    }

    /// All leaves below this node, depth first.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<NodeId>) {
        match self {
            FolderTreeNode::Leaf(id) => out.push(*id),
            _ => self.children().iter().for_each(|child| child.collect_leaves(out)),
        }
    }
}
