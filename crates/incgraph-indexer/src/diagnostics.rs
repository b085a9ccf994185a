//! Non-fatal problems reported while building a graph

use serde::Serialize;
use std::fmt;
use tracing::warn;

/// A problem that did not stop graph construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// An include spec that matched no file in the search directories.
    Unresolved {
        includer: String,
        spec: String,
        line: usize,
    },
    /// A file that could not be read; its node stays a leaf.
    ReadFailed { path: String, error: String },
    /// A trace line whose parent file has no include to attach to.
    OrphanedTraceLine { line: usize, text: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Unresolved { includer, spec, line } => {
                write!(f, "{}:{}: unable to resolve include '{}'", includer, line + 1, spec)
            }
            Diagnostic::ReadFailed { path, error } => write!(f, "failed to read {}: {}", path, error),
            Diagnostic::OrphanedTraceLine { line, text } => {
                write!(f, "trace line {} has no parent include: {}", line + 1, text.trim())
            }
        }
    }
}

/// Receives diagnostics as they happen.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Logs every diagnostic as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Counts diagnostics while forwarding them to another sink.
#[derive(Debug)]
pub struct CountingSink<S> {
    inner: S,
    pub count: usize,
}

impl<S: DiagnosticSink> CountingSink<S> {
    pub fn new(inner: S) -> Self {
        CountingSink { inner, count: 0 }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: DiagnosticSink> DiagnosticSink for CountingSink<S> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        self.inner.report(diagnostic);
    }
}
