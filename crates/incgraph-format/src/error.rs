use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid precedence regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
