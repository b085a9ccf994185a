//! Source file discovery for multi-root graphs

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Patterns used when none are configured.
pub const DEFAULT_SOURCE_PATTERNS: &[&str] = &["*.c", "*.cc", "*.cpp", "*.cxx"];

/// Walk `directory` and return the files whose name or relative path matches
/// one of `patterns`, sorted. `.gitignore` rules are honored.
pub fn discover_sources(directory: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    if directory.is_file() {
        return Ok(vec![directory.to_path_buf()]);
    }
    if !directory.is_dir() {
        anyhow::bail!("Path does not exist: {}", directory.display());
    }

    let glob_set = build_glob_set(patterns)?;
    let walker = WalkBuilder::new(directory)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("Error walking directory: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(directory).unwrap_or(path);
        let name_matches = path.file_name().is_some_and(|name| glob_set.is_match(name));
        if name_matches || glob_set.is_match(relative) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    debug!("Discovered {} source files in {}", files.len(), directory.display());
    Ok(files)
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    if patterns.is_empty() {
        for pattern in DEFAULT_SOURCE_PATTERNS {
            builder.add(Glob::new(pattern)?);
        }
    } else {
        for pattern in patterns {
            builder.add(Glob::new(pattern).with_context(|| format!("Invalid source pattern '{}'", pattern))?);
        }
    }
    Ok(builder.build()?)
}
