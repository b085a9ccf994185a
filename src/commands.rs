//! CLI command implementations

use crate::config::{Config, GraphSettings};
use anyhow::Context;
use incgraph_core::{
    DgmlGraph, GroupState, IncludeGraph, NodeId, TransitiveClosure, group_by_folder, paths, render_folder_tree,
    render_include_tree,
};
use incgraph_format::format_include_block;
use incgraph_indexer::{
    CountingSink, ExpandOptions, GraphExpander, TraceSyntax, TracingSink, discover_sources, ingest_trace,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Search and stop directories from the command line, ahead of the configured ones.
#[derive(Debug, Clone, Default)]
pub struct DirArgs {
    pub include_dirs: Vec<PathBuf>,
    pub stop_dirs: Vec<PathBuf>,
}

impl DirArgs {
    fn expand_options(&self, settings: &GraphSettings) -> ExpandOptions {
        ExpandOptions {
            search_dirs: merged(&self.include_dirs, &settings.include_dirs),
            stop_dirs: merged(&self.stop_dirs, &settings.stop_dirs),
            ignore_includes_in_conditionals: settings.ignore_includes_in_conditionals,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub dgml: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

fn merged(first: &[PathBuf], second: &[PathBuf]) -> Vec<PathBuf> {
    first.iter().chain(second).cloned().collect()
}

/// A built graph with its closure, produced off the async runtime.
struct Analysis {
    graph: IncludeGraph,
    closure: TransitiveClosure,
    roots: Vec<NodeId>,
    diagnostics: usize,
}

async fn build_graph(roots: Vec<PathBuf>, options: ExpandOptions) -> anyhow::Result<Analysis> {
    tokio::task::spawn_blocking(move || {
        let expander = GraphExpander::new(options);
        let mut graph = IncludeGraph::new();
        let mut sink = CountingSink::new(TracingSink);
        let roots = expander.expand_all(&mut graph, &roots, &mut sink);
        let closure = TransitiveClosure::compute(&graph);
        Analysis {
            graph,
            closure,
            roots,
            diagnostics: sink.count,
        }
    })
    .await
    .context("Graph building task failed")
}

pub async fn graph(
    inputs: Vec<PathBuf>,
    dirs: DirArgs,
    export: ExportArgs,
    top: Option<usize>,
    relative: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let mut roots = Vec::new();
    for input in &inputs {
        roots.extend(discover_sources(input, &config.graph.sources)?);
    }
    if roots.is_empty() {
        anyhow::bail!("No source files found");
    }
    tracing::info!("Building include graph from {} source files", roots.len());

    let options = dirs.expand_options(&config.graph);
    let mut base_dirs: Vec<PathBuf> = options.search_dirs.clone();
    base_dirs.extend(inputs.iter().filter(|input| input.is_dir()).cloned());

    let mut analysis = build_graph(roots, options).await?;
    if relative {
        let base_dirs: Vec<String> = base_dirs.iter().map(|dir| paths::canonical_identity(dir)).collect();
        analysis.graph.relabel_relative(&base_dirs);
    }

    print_summary(&analysis);
    if let Some(n) = top {
        print_top(&analysis, n);
    }
    export_graph(&analysis.graph, &analysis.closure, &export, &config.graph)
}

pub async fn trace(
    trace_file: PathBuf,
    root: PathBuf,
    syntax: TraceSyntax,
    export: ExportArgs,
    config: &Config,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&trace_file)
        .with_context(|| format!("Failed to read trace {}", trace_file.display()))?;
    tracing::info!("Ingesting {:?} trace from {}", syntax, trace_file.display());

    let mut graph = IncludeGraph::new();
    let mut sink = CountingSink::new(TracingSink);
    let report = ingest_trace(&mut graph, &root.to_string_lossy(), &text, syntax, &mut sink);
    let closure = TransitiveClosure::compute(&graph);

    println!(
        "{} files, {} includes, {} orphaned trace lines",
        graph.node_count(),
        report.edges_added,
        report.orphaned
    );
    println!(
        "{} includes {} unique files",
        root.display(),
        closure.descendant_count(report.root)
    );
    export_graph(&graph, &closure, &export, &config.graph)
}

pub async fn tree(file: PathBuf, dirs: DirArgs, hierarchy: bool, config: &Config) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("Not a file: {}", file.display());
    }
    let options = dirs.expand_options(&config.graph);
    let analysis = build_graph(vec![file], options).await?;
    let Some(&root) = analysis.roots.first() else {
        anyhow::bail!("Graph building produced no root");
    };

    if hierarchy {
        print!("{}", render_include_tree(&analysis.graph, root));
    } else {
        let tree = group_by_folder(&analysis.graph, analysis.closure.descendants(root), Some(root));
        print!("{}", render_folder_tree(&analysis.graph, &tree));
    }
    Ok(())
}

/// Format the include block of every file in parallel.
pub fn format(files: Vec<PathBuf>, include_dirs: Vec<PathBuf>, in_place: bool, config: &Config) -> anyhow::Result<()> {
    let include_dirs = merged(&include_dirs, &config.graph.include_dirs);
    let options = &config.format;

    let results: Vec<(PathBuf, anyhow::Result<(String, String)>)> = files
        .into_par_iter()
        .map(|file| {
            let result = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))
                .and_then(|text| {
                    let formatted = format_include_block(&text, &file, &include_dirs, options)
                        .with_context(|| format!("Failed to format {}", file.display()))?;
                    Ok((text, formatted))
                });
            (file, result)
        })
        .collect();

    let mut changed = 0;
    for (file, result) in results {
        let (original, formatted) = result?;
        if !in_place {
            print!("{}", formatted);
            continue;
        }
        if original != formatted {
            std::fs::write(&file, &formatted).with_context(|| format!("Failed to write {}", file.display()))?;
            tracing::info!("Formatted {}", file.display());
            changed += 1;
        }
    }
    if in_place {
        tracing::info!("{} files changed", changed);
    }
    Ok(())
}

fn print_summary(analysis: &Analysis) {
    println!(
        "{} files ({} unresolved), {} includes, {} diagnostics",
        analysis.graph.node_count(),
        analysis.graph.unresolved_count(),
        analysis.graph.edge_count(),
        analysis.diagnostics
    );
}

/// Print the `n` nodes with the most unique transitive includes.
fn print_top(analysis: &Analysis, n: usize) {
    let mut ranked: Vec<_> = analysis
        .graph
        .all_nodes()
        .map(|node| (analysis.closure.descendant_count(node.id), node))
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.display_name.cmp(&b.1.display_name)));

    for (count, node) in ranked.into_iter().take(n) {
        println!("{:>6}  {}", count, node.display_name);
    }
}

fn export_graph(
    graph: &IncludeGraph,
    closure: &TransitiveClosure,
    export: &ExportArgs,
    settings: &GraphSettings,
) -> anyhow::Result<()> {
    if export.dgml.is_none() && export.json.is_none() {
        return Ok(());
    }

    let grouping = settings.folder_grouping.then_some(if settings.expand_groups {
        GroupState::Expanded
    } else {
        GroupState::Collapsed
    });
    let mut dgml = DgmlGraph::from_graph(graph, closure, grouping);
    if settings.colorize {
        dgml.colorize(settings.no_children_color, settings.max_children_color);
    }

    if let Some(path) = &export.dgml {
        write_output(path, &dgml.to_xml())?;
    }
    if let Some(path) = &export.json {
        write_output(path, &dgml.to_json()?)?;
    }
    Ok(())
}

fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}
