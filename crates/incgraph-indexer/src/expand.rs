//! Recursive include graph construction by parsing source files

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::resolver::{Resolution, resolve};
use crate::scanner::{ScanOptions, scan};
use incgraph_core::{IncludeGraph, NodeId, paths};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source of file contents for the expander.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Reads files from disk. Invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpandOptions {
    /// Include directories, tried after the including file's own directory.
    pub search_dirs: Vec<PathBuf>,
    /// Files below these directories become nodes but are not parsed.
    pub stop_dirs: Vec<PathBuf>,
    pub ignore_includes_in_conditionals: bool,
}

/// Builds an include graph by following `#include` directives from root files.
///
/// Every file is parsed at most once per graph: a root or include target that
/// already has a node is not expanded again.
pub struct GraphExpander<L = FsLoader> {
    loader: L,
    search_dirs: Vec<PathBuf>,
    stop_dirs: Vec<String>,
    scan_options: ScanOptions,
}

impl GraphExpander<FsLoader> {
    pub fn new(options: ExpandOptions) -> Self {
        Self::with_loader(options, FsLoader)
    }
}

impl<L: SourceLoader> GraphExpander<L> {
    pub fn with_loader(options: ExpandOptions, loader: L) -> Self {
        let stop_dirs = options
            .stop_dirs
            .iter()
            .map(|dir| paths::canonical_identity(dir))
            .collect();

        GraphExpander {
            loader,
            search_dirs: options.search_dirs,
            stop_dirs,
            scan_options: ScanOptions {
                keep_only_valid_includes: true,
                ignore_includes_in_conditionals: options.ignore_includes_in_conditionals,
                ..Default::default()
            },
        }
    }

    /// Expand the graph from one root file and return the root's node.
    pub fn expand(&self, graph: &mut IncludeGraph, root: &Path, sink: &mut dyn DiagnosticSink) -> NodeId {
        let (root_id, created) = graph.create_or_get(&root.to_string_lossy());
        if !created {
            debug!("Skipping {}: already in graph", root.display());
            return root_id;
        }

        let before = graph.node_count();
        self.parse_file(graph, root_id, sink);
        info!(
            "Expanded {}: {} new files, {} files total",
            root.display(),
            graph.node_count() - before + 1,
            graph.node_count()
        );
        root_id
    }

    /// Expand several independent roots into the same graph.
    pub fn expand_all<P: AsRef<Path>>(
        &self,
        graph: &mut IncludeGraph,
        roots: impl IntoIterator<Item = P>,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<NodeId> {
        roots
            .into_iter()
            .map(|root| self.expand(graph, root.as_ref(), sink))
            .collect()
    }

    fn parse_file(&self, graph: &mut IncludeGraph, file: NodeId, sink: &mut dyn DiagnosticSink) {
        let Some(identity) = graph.node(file).map(|n| n.identity.clone()) else {
            return;
        };

        let content = match self.loader.load(Path::new(&identity)) {
            Ok(content) => content,
            Err(e) => {
                sink.report(Diagnostic::ReadFailed {
                    path: identity,
                    error: e.to_string(),
                });
                return;
            }
        };

        let mut dirs: Vec<&Path> = Vec::with_capacity(self.search_dirs.len() + 1);
        if let Some(parent) = Path::new(&identity).parent() {
            dirs.push(parent);
        }
        dirs.extend(self.search_dirs.iter().map(PathBuf::as_path));

        for line in scan(&content, &self.scan_options) {
            let resolution = resolve(line.content(), &dirs);
            if let Resolution::Unresolved(spec) = &resolution {
                sink.report(Diagnostic::Unresolved {
                    includer: identity.clone(),
                    spec: spec.clone(),
                    line: line.line_number(),
                });
            }

            let (target, created) = graph.create_or_get_canonical(resolution.identity());
            graph.add_include(file, target, Some(line));

            if created && resolution.is_resolved() && !self.is_below_stop_dir(resolution.identity()) {
                self.parse_file(graph, target, sink);
            }
        }
    }

    fn is_below_stop_dir(&self, identity: &str) -> bool {
        let path = Path::new(identity);
        self.stop_dirs.iter().any(|dir| path.starts_with(dir))
    }
}
