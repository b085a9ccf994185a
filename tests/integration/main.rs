//! Integration tests for incgraph
//!
//! These tests verify that the indexer, core and formatter crates work together,
//! both as libraries and through the CLI.

use incgraph_core::{DgmlGraph, GroupState, IncludeGraph, TransitiveClosure, group_by_folder, render_folder_tree};
use incgraph_format::{FormatOptions, format_include_block};
use incgraph_indexer::{Diagnostic, ExpandOptions, GraphExpander, TraceSyntax, discover_sources, ingest_trace};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn create_project(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (path, content) in structure {
        let full_path = temp_dir.path().join(path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(full_path, content).unwrap();
    }
    temp_dir
}

fn sample_project() -> TempDir {
    create_project(&[
        ("src/main.cpp", "#include <vector>\n#include \"util.h\"\n#include <lib/a.h>\n\nint main() {}\n"),
        ("src/util.h", "#pragma once\n#include <missing.h>\n"),
        ("include/lib/a.h", "#pragma once\n#include \"b.h\"\n"),
        ("include/lib/b.h", "#pragma once\n#include <lib/a.h>\n"),
    ])
}

fn incgraph() -> Command {
    Command::new(env!("CARGO_BIN_EXE_incgraph"))
}

fn find(graph: &IncludeGraph, root: &Path, relative: &str) -> incgraph_core::NodeId {
    graph
        .find(&root.join(relative).to_string_lossy())
        .unwrap_or_else(|| panic!("{} not in graph", relative))
}

#[test]
fn test_cli_invocation() {
    let output = incgraph().arg("--help").output().expect("Failed to execute incgraph");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("include graph"));
    assert!(stdout.contains("format"));
}

#[test]
fn test_expand_closure_and_export() {
    let project = sample_project();
    let root = project.path();

    let sources = discover_sources(&root.join("src"), &[]).unwrap();
    assert_eq!(sources.len(), 1);

    let expander = GraphExpander::new(ExpandOptions {
        search_dirs: vec![root.join("include")],
        ..Default::default()
    });
    let mut graph = IncludeGraph::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let roots = expander.expand_all(&mut graph, &sources, &mut diagnostics);

    // main, util.h, a.h, b.h plus the unresolved <vector> and <missing.h>
    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.unresolved_count(), 2);
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| matches!(d, Diagnostic::Unresolved { .. })));

    let closure = TransitiveClosure::compute(&graph);
    let main = roots[0];
    let a = find(&graph, root, "include/lib/a.h");
    let b = find(&graph, root, "include/lib/b.h");
    assert_eq!(closure.descendant_count(main), 5);
    assert_eq!(closure.descendant_count(a), 1);
    assert_eq!(closure.descendant_count(b), 1);
    assert_eq!(closure.max_descendant_count(), 5);

    let tree = group_by_folder(&graph, closure.descendants(main), Some(main));
    let rendered = render_folder_tree(&graph, &tree);
    assert!(rendered.starts_with("[<unresolved>]\n"));
    assert!(rendered.contains("missing.h"));

    let mut dgml = DgmlGraph::from_graph(&graph, &closure, Some(GroupState::Collapsed));
    dgml.colorize("#FFFFFF".parse().unwrap(), "#FF0000".parse().unwrap());
    let xml = dgml.to_xml();
    assert!(xml.contains("<DirectedGraph"));
    assert!(xml.contains("TransitiveIncludeCount=\"5\""));
    assert!(xml.contains("Background=\"#FF0000\""));
    assert!(xml.contains("Category=\"Contains\""));
}

#[test]
fn test_trace_matches_parsed_graph_shape() {
    let trace = "util.h\n\tmissing.h\nlib/a.h\n\tlib/b.h\n";
    let mut graph = IncludeGraph::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let report = ingest_trace(&mut graph, "main.cpp", trace, TraceSyntax::Tabs, &mut diagnostics);

    assert_eq!(report.edges_added, 4);
    assert_eq!(report.orphaned, 0);
    assert!(diagnostics.is_empty());

    let closure = TransitiveClosure::compute(&graph);
    assert_eq!(closure.descendant_count(report.root), 4);
}

#[test]
fn test_format_block_resolves_against_project() {
    let project = sample_project();
    let root = project.path();
    let document = root.join("src/main.cpp");
    let text = fs::read_to_string(&document).unwrap();

    let formatted = format_include_block(&text, &document, &[root.join("include")], &FormatOptions::default()).unwrap();
    assert_eq!(
        formatted,
        "#include \"util.h\"\n#include <lib/a.h>\n#include <vector>\n\nint main() {}\n"
    );
}

#[test]
fn test_cli_graph_writes_dgml() {
    let project = sample_project();
    let root = project.path();
    let out = root.join("graph.dgml");

    let output = incgraph()
        .current_dir(root)
        .arg("graph")
        .arg(root.join("src"))
        .arg("-I")
        .arg(root.join("include"))
        .arg("--dgml")
        .arg(&out)
        .args(["--top", "2", "--relative"])
        .output()
        .expect("Failed to execute incgraph");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("6 files (2 unresolved)"));
    assert!(stdout.contains("main.cpp"));

    let xml = fs::read_to_string(&out).unwrap();
    assert!(xml.contains("Label=\"lib/a.h\""));
}

#[test]
fn test_cli_format_in_place_uses_config() {
    let project = sample_project();
    let root = project.path();
    fs::write(
        root.join("incgraph.toml"),
        "[format]\ndelimiter_order = \"angle-brackets-first\"\n",
    )
    .unwrap();

    let output = incgraph()
        .current_dir(root)
        .args(["format", "--in-place", "-I", "include", "src/main.cpp"])
        .output()
        .expect("Failed to execute incgraph");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(root.join("src/main.cpp")).unwrap(),
        "#include <lib/a.h>\n#include <vector>\n#include \"util.h\"\n\nint main() {}\n"
    );
}
