//! Line-based classification of `#include` directives
//!
//! This is a lexical scan, not a preprocessor: comments are tracked with a
//! simple counter and conditional blocks are only counted, never evaluated.

use incgraph_core::IncludeLine;
use std::ops::Range;

const INCLUDE_TOKEN: &str = "#include";

/// Options for [`scan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Drop whitespace-only lines. Line numbers keep counting the dropped lines.
    pub remove_empty_lines: bool,
    /// Treat includes inside `#if`/`#ifdef`/`#ifndef` blocks as plain lines.
    pub ignore_includes_in_conditionals: bool,
    /// Drop every line that is not an active include. Implies `remove_empty_lines`.
    pub keep_only_valid_includes: bool,
}

impl ScanOptions {
    /// Options used when following includes to build a graph.
    pub fn includes_only() -> Self {
        ScanOptions {
            keep_only_valid_includes: true,
            ..Default::default()
        }
    }
}

/// Byte ranges of the lines of `text`, excluding line terminators.
///
/// Lines end at `\r\n`, `\r` or `\n`. A trailing newline yields a final empty line.
pub fn line_ranges(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                ranges.push(start..i);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                ranges.push(start..i);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    ranges.push(start..text.len());
    ranges
}

/// Split text into lines, see [`line_ranges`].
pub fn split_lines(text: &str) -> Vec<&str> {
    line_ranges(text).into_iter().map(|range| &text[range]).collect()
}

/// Comment markers found on a single line.
struct CommentSpan {
    start: Option<usize>,
    end: Option<usize>,
    open_comments: usize,
}

impl CommentSpan {
    fn is_commented(&self, pos: usize) -> bool {
        match self.start {
            None => self.open_comments > 0,
            Some(start) => pos > start && self.end.is_none_or(|end| pos < end),
        }
    }
}

/// Scan `text` into one record per line.
pub fn scan(text: &str, options: &ScanOptions) -> Vec<IncludeLine> {
    let remove_empty = options.remove_empty_lines || options.keep_only_valid_includes;
    let mut open_comments: usize = 0;
    let mut open_conditionals: usize = 0;
    let mut out = Vec::new();

    for (number, line) in split_lines(text).into_iter().enumerate() {
        if remove_empty && line.trim().is_empty() {
            continue;
        }

        let span = comment_span(line, &mut open_comments);
        let parsed = classify(line, number, &span, options, &mut open_conditionals);

        if options.keep_only_valid_includes && !parsed.is_include() {
            continue;
        }
        out.push(parsed);
    }

    out
}

fn comment_span(line: &str, open_comments: &mut usize) -> CommentSpan {
    let mut start = line.find("//");
    let block_open = line.find("/*");
    let block_close = line.find("*/");

    if let Some(open) = block_open {
        let before_line_comment = start.is_none_or(|s| open < s);
        let before_close = block_close.is_none_or(|c| open < c);
        if before_line_comment && before_close {
            *open_comments += 1;
            start = Some(open);
        }
    }
    if block_close.is_some() {
        *open_comments = open_comments.saturating_sub(1);
    }

    CommentSpan {
        start,
        end: block_close,
        open_comments: *open_comments,
    }
}

fn classify(
    line: &str,
    number: usize,
    span: &CommentSpan,
    options: &ScanOptions,
    open_conditionals: &mut usize,
) -> IncludeLine {
    if options.ignore_includes_in_conditionals {
        let if_pos = line.find("#if");
        let endif_pos = line.find("#endif");
        if if_pos.is_some_and(|p| !span.is_commented(p)) {
            *open_conditionals += 1;
            return IncludeLine::new(line, number);
        }
        if endif_pos.is_some_and(|p| !span.is_commented(p)) {
            *open_conditionals = open_conditionals.saturating_sub(1);
            return IncludeLine::new(line, number);
        }
    }

    let Some(token) = line.find(INCLUDE_TOKEN) else {
        return IncludeLine::new(line, number);
    };
    if span.is_commented(token) || *open_conditionals > 0 {
        return IncludeLine::new(line, number);
    }

    let after = token + INCLUDE_TOKEN.len();
    let delimiters = match find_from(line, '"', after) {
        Some(open) => find_from(line, '"', open + 1).map(|close| (open, close)),
        None => find_from(line, '<', after).and_then(|open| find_from(line, '>', open + 1).map(|close| (open, close))),
    };

    match delimiters {
        Some((open, close)) => IncludeLine::with_delimiters(line, number, open, close),
        None => IncludeLine::new(line, number),
    }
}

fn find_from(line: &str, needle: char, from: usize) -> Option<usize> {
    line.get(from..)?.find(needle).map(|pos| pos + from)
}
