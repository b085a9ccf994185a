//! Include scanning, resolution and graph construction

pub mod diagnostics;
pub mod discovery;
pub mod expand;
pub mod resolver;
pub mod scanner;
pub mod trace;


pub use diagnostics::{CountingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use discovery::{DEFAULT_SOURCE_PATTERNS, discover_sources};
pub use expand::{ExpandOptions, FsLoader, GraphExpander, SourceLoader};
pub use resolver::{Resolution, resolve};
pub use scanner::{ScanOptions, line_ranges, scan, split_lines};
pub use trace::{TraceReport, TraceSyntax, ingest_trace};
