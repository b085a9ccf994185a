//! Formatter settings, loadable from the `[format]` table of the config file

use serde::{Deserialize, Serialize};

/// Macro in precedence patterns replaced with the document's file stem.
pub const CURRENT_FILENAME_MACRO: &str = "$(currentFilename)";

/// How include paths are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMode {
    Unchanged,
    /// Shortest path relative to any search directory.
    Shortest,
    /// Shortest path that does not climb out of its search directory.
    #[default]
    ShortestAvoidUpSteps,
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelimiterMode {
    #[default]
    Unchanged,
    AngleBrackets,
    Quotes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlashMode {
    Unchanged,
    #[default]
    ForwardSlash,
    BackSlash,
}

/// Final ordering pass on delimiter kind, applied after precedence grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelimiterOrder {
    None,
    AngleBracketsFirst,
    #[default]
    QuotesFirst,
}

/// Options for the sorting stage alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    pub delimiter_order: DelimiterOrder,
    pub blank_line_between_groups: bool,
    pub regex_includes_delimiters: bool,
    pub remove_duplicates: bool,
    pub remove_empty_lines: bool,
    pub split_at_directives: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        FormatOptions::default().sort_options()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub path_mode: PathMode,
    /// Do not consider the document's own directory when rewriting paths.
    pub ignore_file_relative: bool,
    pub delimiter_mode: DelimiterMode,
    pub slash_mode: SlashMode,
    pub remove_empty_lines: bool,
    /// Match precedence patterns against `<path>`/`"path"` instead of the bare path.
    pub regex_includes_delimiters: bool,
    pub blank_line_between_groups: bool,
    /// Earlier match sorts first. See [`CURRENT_FILENAME_MACRO`].
    pub precedence_regexes: Vec<String>,
    pub delimiter_order: DelimiterOrder,
    pub remove_duplicates: bool,
    /// Never move includes across other preprocessor directives.
    pub split_at_directives: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            path_mode: PathMode::default(),
            ignore_file_relative: false,
            delimiter_mode: DelimiterMode::default(),
            slash_mode: SlashMode::default(),
            remove_empty_lines: true,
            regex_includes_delimiters: false,
            blank_line_between_groups: false,
            precedence_regexes: vec![format!(
                r"(?i){}\.(h|hpp|hxx|inl|c|cpp|cxx)(?-i)",
                CURRENT_FILENAME_MACRO
            )],
            delimiter_order: DelimiterOrder::default(),
            remove_duplicates: true,
            split_at_directives: true,
        }
    }
}

impl FormatOptions {
    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            delimiter_order: self.delimiter_order,
            blank_line_between_groups: self.blank_line_between_groups,
            regex_includes_delimiters: self.regex_includes_delimiters,
            remove_duplicates: self.remove_duplicates,
            remove_empty_lines: self.remove_empty_lines,
            split_at_directives: self.split_at_directives,
        }
    }
}
