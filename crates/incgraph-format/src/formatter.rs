//! The include formatting pipeline: paths, delimiters, slashes, then sorting

use crate::error::FormatError;
use crate::options::{DelimiterMode, FormatOptions, PathMode, SlashMode};
use crate::sorter::{PrecedenceRules, sort_includes};
use incgraph_core::{DelimiterKind, IncludeLine, paths};
use incgraph_indexer::{Resolution, ScanOptions, line_ranges, resolve, scan};
use std::path::{Path, PathBuf};
use tracing::debug;

/// `"\r\n"` if CRLF line endings outnumber bare LF ones, else `"\n"`.
pub fn dominant_newline(text: &str) -> &'static str {
    let crlf = text.matches("\r\n").count();
    let lf = text.matches('\n').count() - crlf;
    if crlf > lf { "\r\n" } else { "\n" }
}

/// Rewrite and reorder the include lines of `text`.
///
/// `document_path` locates the file for relative path computation and provides
/// the stem substituted into precedence patterns. A trailing newline is kept.
pub fn format_includes(
    text: &str,
    document_path: &Path,
    include_dirs: &[PathBuf],
    options: &FormatOptions,
) -> Result<String, FormatError> {
    let stem = document_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let rules = PrecedenceRules::compile(&options.precedence_regexes, &stem)?;

    let newline = dominant_newline(text);
    let (body, trailing) = split_trailing_newline(text);

    let mut lines = scan(
        body,
        &ScanOptions {
            remove_empty_lines: options.remove_empty_lines,
            ..Default::default()
        },
    );

    let mut dirs: Vec<PathBuf> = Vec::with_capacity(include_dirs.len() + 1);
    if !options.ignore_file_relative {
        if let Some(parent) = document_path.parent() {
            dirs.push(parent.to_path_buf());
        }
    }
    dirs.extend(include_dirs.iter().cloned());

    format_paths(&mut lines, options.path_mode, &dirs);
    format_delimiters(&mut lines, options.delimiter_mode);
    format_slashes(&mut lines, options.slash_mode);

    let lines = sort_includes(lines, &rules, &options.sort_options());
    let texts: Vec<String> = lines.into_iter().map(IncludeLine::into_text).collect();

    let mut formatted = texts.join(newline);
    formatted.push_str(trailing);
    Ok(formatted)
}

/// Format only the block from the first to the last active include of `text`.
///
/// Everything outside that block is returned unchanged. Text without includes
/// is returned as is.
pub fn format_include_block(
    text: &str,
    document_path: &Path,
    include_dirs: &[PathBuf],
    options: &FormatOptions,
) -> Result<String, FormatError> {
    let includes: Vec<usize> = scan(text, &ScanOptions::includes_only())
        .iter()
        .map(IncludeLine::line_number)
        .collect();
    let (Some(&first), Some(&last)) = (includes.first(), includes.last()) else {
        return Ok(text.to_string());
    };

    let ranges = line_ranges(text);
    let start = ranges[first].start;
    let end = ranges[last].end;
    debug!(
        "Formatting include block of {}: lines {}..={}",
        document_path.display(),
        first + 1,
        last + 1
    );

    let block = format_includes(&text[start..end], document_path, include_dirs, options)?;
    Ok(format!("{}{}{}", &text[..start], block, &text[end..]))
}

fn split_trailing_newline(text: &str) -> (&str, &str) {
    for ending in ["\r\n", "\n", "\r"] {
        if let Some(body) = text.strip_suffix(ending) {
            return (body, ending);
        }
    }
    (text, "")
}

/// Rewrite resolvable include paths. Unresolved includes are left untouched.
fn format_paths(lines: &mut [IncludeLine], mode: PathMode, dirs: &[PathBuf]) {
    if mode == PathMode::Unchanged {
        return;
    }
    let canonical_dirs: Vec<String> = dirs.iter().map(|dir| paths::canonical_identity(dir)).collect();

    for line in lines.iter_mut().filter(|line| line.is_include()) {
        let Resolution::Resolved(identity) = resolve(line.content(), dirs) else {
            continue;
        };
        let formatted = match mode {
            PathMode::Absolute => Some(identity),
            PathMode::Shortest | PathMode::ShortestAvoidUpSteps => paths::shortest_relative(
                &identity,
                canonical_dirs.iter().map(String::as_str),
                mode == PathMode::ShortestAvoidUpSteps,
            ),
            PathMode::Unchanged => None,
        };
        if let Some(formatted) = formatted {
            line.set_content(&formatted);
        }
    }
}

fn format_delimiters(lines: &mut [IncludeLine], mode: DelimiterMode) {
    let kind = match mode {
        DelimiterMode::Unchanged => return,
        DelimiterMode::AngleBrackets => DelimiterKind::AngleBrackets,
        DelimiterMode::Quotes => DelimiterKind::Quotes,
    };
    for line in lines.iter_mut() {
        line.set_delimiter_kind(kind);
    }
}

fn format_slashes(lines: &mut [IncludeLine], mode: SlashMode) {
    let (from, to) = match mode {
        SlashMode::Unchanged => return,
        SlashMode::ForwardSlash => ('\\', "/"),
        SlashMode::BackSlash => ('/', "\\"),
    };
    for line in lines.iter_mut().filter(|line| line.content().contains(from)) {
        let content = line.content().replace(from, to);
        line.set_content(&content);
    }
}
