//! Unit tests for incgraph-format

use crate::*;
use incgraph_indexer::{ScanOptions, scan};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn unchanged_paths() -> FormatOptions {
    FormatOptions {
        path_mode: PathMode::Unchanged,
        ..Default::default()
    }
}

fn format(text: &str, document: &str, options: &FormatOptions) -> String {
    format_includes(text, Path::new(document), &[], options).unwrap()
}

#[test]
fn test_default_options() {
    let options = FormatOptions::default();
    assert_eq!(options.path_mode, PathMode::ShortestAvoidUpSteps);
    assert_eq!(options.delimiter_mode, DelimiterMode::Unchanged);
    assert_eq!(options.slash_mode, SlashMode::ForwardSlash);
    assert_eq!(options.delimiter_order, DelimiterOrder::QuotesFirst);
    assert!(options.remove_empty_lines);
    assert!(options.remove_duplicates);
    assert!(!options.blank_line_between_groups);
    assert!(!options.regex_includes_delimiters);
    assert_eq!(
        options.precedence_regexes,
        vec![r"(?i)$(currentFilename)\.(h|hpp|hxx|inl|c|cpp|cxx)(?-i)".to_string()]
    );
}

#[test]
fn test_sort_puts_own_header_first_then_quotes() {
    let text = [
        "#include <vector>",
        "#include \"b.h\"",
        "#include \"FOO.hpp\"",
        "#include <algorithm>",
        "#include \"a.h\"",
    ]
    .join("\n");

    insta::assert_snapshot!(format(&text, "/src/foo.cpp", &unchanged_paths()), @r#"
    #include "FOO.hpp"
    #include "a.h"
    #include "b.h"
    #include <algorithm>
    #include <vector>
    "#);
}

#[test]
fn test_sort_is_stable_for_equal_keys() {
    let lines = scan("#include \"a.h\" // first\n#include <a.h>\n#include \"a.h\" // second", &ScanOptions::default());
    let rules = PrecedenceRules::compile(&[] as &[&str], "main").unwrap();
    let options = SortOptions {
        delimiter_order: DelimiterOrder::None,
        remove_duplicates: false,
        ..Default::default()
    };

    let sorted = sort_includes(lines, &rules, &options);
    let texts: Vec<_> = sorted.iter().map(|l| l.text()).collect();
    assert_eq!(texts, vec!["#include \"a.h\" // first", "#include <a.h>", "#include \"a.h\" // second"]);
}

#[test]
fn test_sort_respects_directive_batches() {
    let text = [
        "#pragma once",
        "#include \"z.h\"",
        "// comment",
        "#include \"a.h\"",
        "#ifdef X",
        "#include \"y.h\"",
        "#include \"b.h\"",
        "#endif",
    ]
    .join("\n");

    let batched = format(&text, "main.cpp", &unchanged_paths());
    assert_eq!(
        batched,
        [
            "#pragma once",
            "#include \"a.h\"",
            "// comment",
            "#include \"z.h\"",
            "#ifdef X",
            "#include \"b.h\"",
            "#include \"y.h\"",
            "#endif",
        ]
        .join("\n")
    );

    let whole = format(
        &text,
        "main.cpp",
        &FormatOptions {
            split_at_directives: false,
            ..unchanged_paths()
        },
    );
    assert_eq!(
        whole,
        [
            "#pragma once",
            "#include \"a.h\"",
            "// comment",
            "#include \"b.h\"",
            "#ifdef X",
            "#include \"y.h\"",
            "#include \"z.h\"",
            "#endif",
        ]
        .join("\n")
    );
}

#[test]
fn test_remove_duplicates_honors_preserve_marker() {
    let text = [
        "#include \"a.h\"",
        "#include \"b.h\"",
        "#include \"a.h\"",
        "#include \"a.h\" // $incgraph-preserve$",
        "#include <a.h>",
    ]
    .join("\n");

    assert_eq!(
        format(&text, "main.cpp", &unchanged_paths()),
        [
            "#include \"a.h\"",
            "#include \"a.h\" // $incgraph-preserve$",
            "#include \"b.h\"",
            "#include <a.h>",
        ]
        .join("\n")
    );

    let keep_empty = FormatOptions {
        remove_empty_lines: false,
        ..unchanged_paths()
    };
    let formatted = format(&text, "main.cpp", &keep_empty);
    assert_eq!(formatted.split('\n').count(), 5);
    assert!(formatted.ends_with("#include <a.h>\n"));
}

fn grouped_options(order: DelimiterOrder) -> FormatOptions {
    FormatOptions {
        precedence_regexes: vec!["^std/".to_string(), "^lib/".to_string()],
        blank_line_between_groups: true,
        delimiter_order: order,
        ..unchanged_paths()
    }
}

const GROUPED_INPUT: &str = "#include <lib/x.h>\n#include \"local.h\"\n#include <std/a.h>\n#include \"lib/y.h\"";

#[test]
fn test_blank_lines_between_precedence_groups() {
    let formatted = format(GROUPED_INPUT, "main.cpp", &grouped_options(DelimiterOrder::None));
    assert_eq!(
        formatted,
        [
            "#include <std/a.h>",
            "",
            "#include <lib/x.h>",
            "#include \"lib/y.h\"",
            "",
            "#include \"local.h\"",
        ]
        .join("\n")
    );
}

#[test]
fn test_delimiter_order_moves_group_markers() {
    // The delimiter pass runs after grouping, so group-start markers travel with
    // their lines and separators end up between delimiter runs.
    let formatted = format(GROUPED_INPUT, "main.cpp", &grouped_options(DelimiterOrder::QuotesFirst));
    assert_eq!(
        formatted,
        [
            "#include \"lib/y.h\"",
            "",
            "#include \"local.h\"",
            "",
            "#include <std/a.h>",
            "",
            "#include <lib/x.h>",
        ]
        .join("\n")
    );
}

#[test]
fn test_no_separator_after_non_include_lines() {
    let options = FormatOptions {
        precedence_regexes: vec!["^a".to_string(), "^b".to_string()],
        blank_line_between_groups: true,
        delimiter_order: DelimiterOrder::None,
        ..unchanged_paths()
    };

    let commented = format("#include \"b.h\"\n// keep\n#include \"a.h\"", "main.cpp", &options);
    assert_eq!(commented, "#include \"a.h\"\n// keep\n#include \"b.h\"");

    let code = format("#include \"b.h\"\nint x;\n#include \"a.h\"", "main.cpp", &options);
    assert_eq!(code, "#include \"a.h\"\nint x;\n#include \"b.h\"");

    let adjacent = format("#include \"b.h\"\n#include \"a.h\"", "main.cpp", &options);
    assert_eq!(adjacent, "#include \"a.h\"\n\n#include \"b.h\"");
}

#[test]
fn test_blank_lines_need_more_than_one_pattern() {
    let options = FormatOptions {
        precedence_regexes: vec!["^std/".to_string()],
        blank_line_between_groups: true,
        delimiter_order: DelimiterOrder::None,
        ..unchanged_paths()
    };
    let formatted = format(GROUPED_INPUT, "main.cpp", &options);
    assert!(!formatted.contains("\n\n"));
    assert!(formatted.starts_with("#include <std/a.h>"));
}

#[test]
fn test_regex_can_match_delimiters() {
    let options = FormatOptions {
        precedence_regexes: vec!["^<".to_string()],
        regex_includes_delimiters: true,
        delimiter_order: DelimiterOrder::None,
        ..unchanged_paths()
    };
    let formatted = format("#include \"a.h\"\n#include <z.h>", "main.cpp", &options);
    assert_eq!(formatted, "#include <z.h>\n#include \"a.h\"");
}

#[test]
fn test_delimiter_and_slash_modes() {
    let options = FormatOptions {
        delimiter_mode: DelimiterMode::Quotes,
        slash_mode: SlashMode::BackSlash,
        delimiter_order: DelimiterOrder::None,
        ..unchanged_paths()
    };
    let formatted = format("#include <c/d.h>\n#include \"a/b.h\"", "main.cpp", &options);
    assert_eq!(formatted, "#include \"a\\b.h\"\n#include \"c\\d.h\"");

    let forward = FormatOptions {
        delimiter_mode: DelimiterMode::AngleBrackets,
        ..unchanged_paths()
    };
    assert_eq!(format("#include \"x\\y.h\"", "main.cpp", &forward), "#include <x/y.h>");
}

#[test]
fn test_newlines_are_preserved() {
    let formatted = format("#include \"b.h\"\r\n#include \"a.h\"\r\n", "main.cpp", &unchanged_paths());
    assert_eq!(formatted, "#include \"a.h\"\r\n#include \"b.h\"\r\n");
}

#[test]
fn test_invalid_regex_is_an_error() {
    let options = FormatOptions {
        precedence_regexes: vec!["([".to_string()],
        ..unchanged_paths()
    };
    let result = format_includes("#include \"a.h\"", Path::new("main.cpp"), &[], &options);
    assert!(matches!(result, Err(FormatError::InvalidRegex { .. })));
}

fn path_fixture() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for path in ["src/main.cpp", "src/detail/d.h", "include/lib/a.h", "include/lib/b.h"] {
        let full_path = temp_dir.path().join(path);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(full_path, "").unwrap();
    }
    temp_dir
}

const PATH_INPUT: &str =
    "#include \"../include/lib/a.h\"\n#include <lib\\b.h>\n#include \"detail/d.h\"\n#include <vector>";

#[test]
fn test_paths_shortest_without_up_steps() {
    let temp_dir = path_fixture();
    let root = temp_dir.path();
    let include_dirs = vec![root.join("include")];

    let formatted = format_includes(
        PATH_INPUT,
        &root.join("src/main.cpp"),
        &include_dirs,
        &FormatOptions::default(),
    )
    .unwrap();

    assert_eq!(
        formatted,
        [
            "#include \"detail/d.h\"",
            "#include \"lib/a.h\"",
            "#include <lib/b.h>",
            "#include <vector>",
        ]
        .join("\n")
    );
}

#[test]
fn test_paths_absolute() {
    let temp_dir = path_fixture();
    let root = temp_dir.path();
    let include_dirs: Vec<PathBuf> = vec![root.join("include")];
    let options = FormatOptions {
        path_mode: PathMode::Absolute,
        ..Default::default()
    };

    let formatted = format_includes(PATH_INPUT, &root.join("src/main.cpp"), &include_dirs, &options).unwrap();
    let absolute_a = incgraph_core::paths::canonical_identity(&root.join("include/lib/a.h"));
    assert!(formatted.contains(&format!("\"{}\"", absolute_a)));
    assert!(formatted.contains("#include <vector>"));
}

#[test]
fn test_format_include_block_leaves_surroundings() {
    let text = "// Copyright\n\n#include \"b.h\"\n\n#include \"a.h\"\n\nint main() {\n\n    return 0;\n}\n";
    let formatted = format_include_block(text, Path::new("main.cpp"), &[], &unchanged_paths()).unwrap();
    assert_eq!(
        formatted,
        "// Copyright\n\n#include \"a.h\"\n#include \"b.h\"\n\nint main() {\n\n    return 0;\n}\n"
    );

    let no_includes = "int x;\n\n";
    assert_eq!(
        format_include_block(no_includes, Path::new("main.cpp"), &[], &unchanged_paths()).unwrap(),
        no_includes
    );
}

#[test]
fn test_options_from_toml_style_values() {
    let json = r#"{"path_mode": "shortest", "delimiter_order": "angle-brackets-first", "slash_mode": "back-slash"}"#;
    let options: FormatOptions = serde_json::from_str(json).unwrap();
    assert_eq!(options.path_mode, PathMode::Shortest);
    assert_eq!(options.delimiter_order, DelimiterOrder::AngleBracketsFirst);
    assert_eq!(options.slash_mode, SlashMode::BackSlash);
    assert!(options.remove_empty_lines);
}
