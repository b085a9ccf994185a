//! Export of the include graph to DGML (Directed Graph Markup Language) and JSON

use crate::closure::TransitiveClosure;
use crate::folders::group_by_folder;
use crate::graph::IncludeGraph;
use crate::model::FolderTreeNode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

pub const DGML_NAMESPACE: &str = "http://schemas.microsoft.com/vs/2009/dgml";

/// Initial state of folder group nodes in a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupState {
    Expanded,
    Collapsed,
}

impl GroupState {
    fn as_str(self) -> &'static str {
        match self {
            GroupState::Expanded => "Expanded",
            GroupState::Collapsed => "Collapsed",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color '{0}', expected #RRGGBB")]
pub struct ParseColorError(String);

/// A 24-bit color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Linear blend towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * t + 0.5) as u8;
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DgmlNode {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupState>,
    pub include_count: usize,
    pub transitive_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkCategory {
    Include,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DgmlLink {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub category: LinkCategory,
}

/// Exchange form of an include graph: plain nodes and links keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DgmlGraph {
    pub nodes: Vec<DgmlNode>,
    pub links: Vec<DgmlLink>,
}

impl DgmlGraph {
    /// Build the export graph. With `grouping`, folder nodes and `Contains`
    /// links are added for the folder hierarchy of all graph nodes.
    pub fn from_graph(graph: &IncludeGraph, closure: &TransitiveClosure, grouping: Option<GroupState>) -> Self {
        let mut dgml = DgmlGraph::default();

        for node in graph.all_nodes() {
            let includes = graph.includes_of(node.id);
            dgml.nodes.push(DgmlNode {
                id: node.identity.clone(),
                label: node.display_name.clone(),
                background: None,
                group: None,
                include_count: includes.len(),
                transitive_count: closure.descendant_count(node.id),
            });
            for edge in includes {
                let Some(target) = graph.node(edge.target) else {
                    warn!("Include of {} points at missing node {:?}", node.identity, edge.target);
                    continue;
                };
                dgml.links.push(DgmlLink {
                    source: node.identity.clone(),
                    target: target.identity.clone(),
                    label: None,
                    category: LinkCategory::Include,
                });
            }
        }

        if let Some(state) = grouping {
            let tree = group_by_folder(graph, graph.node_ids(), None);
            for child in tree.children() {
                dgml.add_folder_grouping(graph, child, None, state);
            }
        }

        dgml
    }

    fn add_folder_grouping(
        &mut self,
        graph: &IncludeGraph,
        item: &FolderTreeNode,
        parent: Option<&str>,
        state: GroupState,
    ) {
        let id = match item {
            FolderTreeNode::Leaf(id) => match graph.node(*id) {
                Some(node) => node.identity.clone(),
                None => return,
            },
            FolderTreeNode::Folder { path, .. } => path.clone(),
            FolderTreeNode::Root { .. } => return,
        };

        if let Some(parent) = parent {
            self.links.push(DgmlLink {
                source: parent.to_string(),
                target: id.clone(),
                label: None,
                category: LinkCategory::Contains,
            });
        }

        if let FolderTreeNode::Folder { path, children } = item {
            self.nodes.push(DgmlNode {
                id: path.clone(),
                label: path.clone(),
                background: None,
                group: Some(state),
                include_count: 0,
                transitive_count: 0,
            });
            for child in children {
                self.add_folder_grouping(graph, child, Some(path), state);
            }
        }
    }

    /// Set every node's background by interpolating between two colors by its
    /// transitive include count relative to the largest count.
    pub fn colorize(&mut self, no_children: Rgb, max_children: Rgb) {
        let max = self
            .nodes
            .iter()
            .map(|n| n.transitive_count)
            .max()
            .unwrap_or(0)
            .max(1);

        for node in &mut self.nodes {
            let intensity = node.transitive_count as f32 / max as f32;
            node.background = Some(no_children.lerp(max_children, intensity));
        }
    }

    /// Serialize to a DGML document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(self.nodes.len() * 120 + self.links.len() * 100);

        xml.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        xml.push_str(&format!("<DirectedGraph xmlns=\"{}\">\n", DGML_NAMESPACE));

        xml.push_str("  <Nodes>\n");
        for node in &self.nodes {
            xml.push_str(&format!(
                "    <Node Id=\"{}\" Label=\"{}\"",
                escape_xml(&node.id),
                escape_xml(&node.label)
            ));
            if let Some(background) = node.background {
                xml.push_str(&format!(" Background=\"{}\"", background));
            }
            if let Some(group) = node.group {
                xml.push_str(&format!(" Group=\"{}\"", group.as_str()));
            }
            if node.include_count != 0 {
                xml.push_str(&format!(" IncludeCount=\"{}\"", node.include_count));
            }
            if node.transitive_count != 0 {
                xml.push_str(&format!(" TransitiveIncludeCount=\"{}\"", node.transitive_count));
            }
            xml.push_str(" />\n");
        }
        xml.push_str("  </Nodes>\n");

        xml.push_str("  <Links>\n");
        for link in &self.links {
            xml.push_str(&format!(
                "    <Link Source=\"{}\" Target=\"{}\"",
                escape_xml(&link.source),
                escape_xml(&link.target)
            ));
            if let Some(label) = &link.label {
                xml.push_str(&format!(" Label=\"{}\"", escape_xml(label)));
            }
            if link.category == LinkCategory::Contains {
                xml.push_str(" Category=\"Contains\"");
            }
            xml.push_str(" />\n");
        }
        xml.push_str("  </Links>\n");

        xml.push_str("</DirectedGraph>\n");
        xml
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Escape a string for use inside an XML attribute value.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
