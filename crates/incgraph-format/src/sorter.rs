//! Precedence-based reordering of include lines
//!
//! Includes are sorted by path, grouped by the first precedence pattern they
//! match and put back into the slots previously occupied by includes. All
//! other lines keep their positions.

use crate::error::FormatError;
use crate::options::{CURRENT_FILENAME_MACRO, DelimiterOrder, SortOptions};
use incgraph_core::{DelimiterKind, IncludeLine};
use regex::Regex;
use std::collections::HashSet;
use tracing::trace;

/// Compiled precedence patterns for one document.
#[derive(Debug, Clone)]
pub struct PrecedenceRules {
    regexes: Vec<Regex>,
}

impl PrecedenceRules {
    /// Compile `patterns`, substituting the document stem for [`CURRENT_FILENAME_MACRO`].
    ///
    /// Empty patterns are skipped.
    pub fn compile<S: AsRef<str>>(patterns: &[S], document_stem: &str) -> Result<Self, FormatError> {
        let stem = regex::escape(document_stem);
        let regexes = patterns
            .iter()
            .map(AsRef::as_ref)
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                let pattern = pattern.replace(CURRENT_FILENAME_MACRO, &stem);
                Regex::new(&pattern).map_err(|source| FormatError::InvalidRegex { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PrecedenceRules { regexes })
    }

    pub fn len(&self) -> usize {
        self.regexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }

    /// Index of the first matching pattern, or [`len`](Self::len) if none match.
    pub fn class_of(&self, text: &str) -> usize {
        self.regexes
            .iter()
            .position(|regex| regex.is_match(text))
            .unwrap_or(self.regexes.len())
    }
}

/// An include line on its way through the sort, with its blank-separator mark.
struct Sorted {
    line: IncludeLine,
    group_start: bool,
}

/// Reorder the includes of `lines`.
///
/// With `split_at_directives`, non-include preprocessor lines (`#if`, `#pragma`, ...)
/// split the input into batches that are sorted independently.
pub fn sort_includes(lines: Vec<IncludeLine>, rules: &PrecedenceRules, options: &SortOptions) -> Vec<IncludeLine> {
    let mut out = Vec::with_capacity(lines.len());
    let mut rest = lines.into_iter().peekable();

    loop {
        while let Some(line) = rest.next_if(|line| !line.is_include()) {
            out.push(line);
        }

        let mut batch = Vec::new();
        while let Some(line) =
            rest.next_if(|line| !options.split_at_directives || line.is_include() || !line.is_preprocessor_directive())
        {
            batch.push(line);
        }
        if batch.is_empty() {
            break;
        }
        sort_batch(batch, rules, options, &mut out);
    }

    out
}

fn sort_batch(batch: Vec<IncludeLine>, rules: &PrecedenceRules, options: &SortOptions, out: &mut Vec<IncludeLine>) {
    let key = |line: &IncludeLine| -> String {
        if options.regex_includes_delimiters {
            line.content_with_delimiters().to_string()
        } else {
            line.content().to_string()
        }
    };

    let mut slots = Vec::with_capacity(batch.len());
    let mut includes = Vec::new();
    for line in batch {
        if line.is_include() {
            slots.push(None);
            includes.push(line);
        } else {
            slots.push(Some(line));
        }
    }

    includes.sort_by_cached_key(|line| key(line));

    if options.remove_duplicates {
        let mut seen = HashSet::new();
        includes.retain(|line| line.is_preserved() || seen.insert(line.content_with_delimiters().to_string()));
    }

    let mut classified: Vec<(usize, IncludeLine)> = includes
        .into_iter()
        .map(|line| (rules.class_of(&key(&line)), line))
        .collect();
    classified.sort_by_key(|(class, _)| *class);

    let mark_groups = options.blank_line_between_groups && rules.len() > 1 && classified.len() > 1;
    let mut sorted: Vec<Sorted> = Vec::with_capacity(classified.len());
    let mut previous_class = None;
    for (class, line) in classified {
        sorted.push(Sorted {
            line,
            group_start: mark_groups && previous_class != Some(class),
        });
        previous_class = Some(class);
    }

    match options.delimiter_order {
        DelimiterOrder::None => {}
        DelimiterOrder::AngleBracketsFirst => {
            sorted.sort_by_key(|s| s.line.delimiter_kind() != DelimiterKind::AngleBrackets);
        }
        DelimiterOrder::QuotesFirst => {
            sorted.sort_by_key(|s| s.line.delimiter_kind() != DelimiterKind::Quotes);
        }
    }

    let mut sorted = sorted.into_iter();
    let merged = slots.into_iter().map(|slot| match slot {
        Some(line) => Sorted {
            line,
            group_start: false,
        },
        // Slots freed by duplicate removal become empty lines.
        None => sorted.next().unwrap_or_else(|| Sorted {
            line: IncludeLine::blank(),
            group_start: false,
        }),
    });

    for item in merged {
        if options.remove_empty_lines && item.line.is_blank() {
            continue;
        }
        // Separators only go between two includes.
        if item.group_start && out.last().is_some_and(IncludeLine::is_include) {
            trace!("Separating precedence group at '{}'", item.line.content());
            out.push(IncludeLine::blank());
        }
        out.push(item.line);
    }
}
