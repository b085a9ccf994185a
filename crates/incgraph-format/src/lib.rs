//! Include block formatting: path rewriting, delimiter and slash normalization,
//! precedence sorting

pub mod error;
pub mod formatter;
pub mod options;
pub mod sorter;

#[cfg(test)]
pub mod tests;

pub use error::FormatError;
pub use formatter::{dominant_newline, format_include_block, format_includes};
pub use options::{
    CURRENT_FILENAME_MACRO, DelimiterMode, DelimiterOrder, FormatOptions, PathMode, SlashMode, SortOptions,
};
pub use sorter::{PrecedenceRules, sort_includes};
