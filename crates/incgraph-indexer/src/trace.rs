//! Graph construction from compiler include traces
//!
//! A trace lists every opened header with its nesting depth encoded in the
//! indentation. Depth `d` means "included by the last file seen at depth `d - 1`".

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::scanner::split_lines;
use incgraph_core::{IncludeGraph, NodeId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

const SHOW_INCLUDES_NOTE: &str = "Note: including file: ";

/// Format of an include trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceSyntax {
    /// MSVC `/showIncludes`: `Note: including file: ` followed by one space per level.
    #[default]
    ShowIncludes,
    /// GCC/Clang `-H`: one dot per level, a space, then the path.
    Gcc,
    /// One tab per level below the root.
    Tabs,
}

impl FromStr for TraceSyntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "show-includes" | "msvc" => Ok(TraceSyntax::ShowIncludes),
            "gcc" | "clang" => Ok(TraceSyntax::Gcc),
            "tabs" => Ok(TraceSyntax::Tabs),
            other => Err(format!("unknown trace syntax '{}'", other)),
        }
    }
}

impl TraceSyntax {
    /// Zero-based depth and path of a trace line, or `None` if the line is not an entry.
    fn parse_line(self, line: &str) -> Option<(usize, &str)> {
        let (depth, path) = match self {
            TraceSyntax::ShowIncludes => {
                let start = line.find(SHOW_INCLUDES_NOTE)? + SHOW_INCLUDES_NOTE.len();
                let rest = &line[start..];
                let path = rest.trim_start_matches(' ');
                (rest.len() - path.len(), path)
            }
            TraceSyntax::Gcc => {
                let path = line.trim_start_matches('.');
                let dots = line.len() - path.len();
                let path = path.strip_prefix(' ')?;
                (dots.checked_sub(1)?, path)
            }
            TraceSyntax::Tabs => {
                let path = line.trim_start_matches('\t');
                (line.len() - path.len(), path)
            }
        };

        let path = path.trim_end();
        (!path.is_empty()).then_some((depth, path))
    }
}

/// Summary of one trace ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceReport {
    pub root: NodeId,
    /// Entries turned into edges.
    pub edges_added: usize,
    /// Entries dropped because their parent had no include to descend into.
    pub orphaned: usize,
}

/// Add the includes described by `text` below `root`.
///
/// Lines that do not match `syntax` are ignored. Paths are canonicalized when
/// they exist on disk.
pub fn ingest_trace(
    graph: &mut IncludeGraph,
    root: &str,
    text: &str,
    syntax: TraceSyntax,
    sink: &mut dyn DiagnosticSink,
) -> TraceReport {
    let (root_id, _) = graph.create_or_get(root);
    let mut report = TraceReport {
        root: root_id,
        ..Default::default()
    };
    let mut stack = vec![root_id];

    for (number, line) in split_lines(text).into_iter().enumerate() {
        let Some((depth, path)) = syntax.parse_line(line) else {
            continue;
        };

        stack.truncate(depth + 1);
        let mut orphaned = false;
        while stack.len() <= depth {
            let parent = stack[stack.len() - 1];
            match graph.last_include_target(parent) {
                Some(last) => stack.push(last),
                None => {
                    orphaned = true;
                    break;
                }
            }
        }
        if orphaned {
            report.orphaned += 1;
            sink.report(Diagnostic::OrphanedTraceLine {
                line: number,
                text: line.to_string(),
            });
            continue;
        }

        let (target, _) = graph.create_or_get(path);
        let parent = stack[stack.len() - 1];
        graph.add_include(parent, target, None);
        report.edges_added += 1;
    }

    debug!(
        "Ingested {:?} trace: {} edges, {} orphaned lines",
        syntax, report.edges_added, report.orphaned
    );
    report
}
