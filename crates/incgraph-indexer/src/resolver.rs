//! Resolution of include specs against ordered search directories

use incgraph_core::paths;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Outcome of resolving an include spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Canonical identity of the first matching file.
    Resolved(String),
    /// No search directory contains the file; carries the raw spec.
    Unresolved(String),
}

impl Resolution {
    /// Identity to use for the graph node, resolved or not.
    pub fn identity(&self) -> &str {
        match self {
            Resolution::Resolved(identity) | Resolution::Unresolved(identity) => identity,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Try `dir/spec` for every directory in order; the first regular file wins.
pub fn resolve<P: AsRef<Path>>(spec: &str, dirs: &[P]) -> Resolution {
    let relative = PathBuf::from(paths::normalize_separators(spec));

    for dir in dirs {
        let candidate = dir.as_ref().join(&relative);
        if candidate.is_file() {
            let identity = paths::canonical_identity(&candidate);
            trace!("Resolved '{}' to {}", spec, identity);
            return Resolution::Resolved(identity);
        }
    }

    Resolution::Unresolved(spec.to_string())
}
