//! `incgraph.toml` loading

use anyhow::{Context, Result};
use incgraph_core::Rgb;
use incgraph_format::FormatOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "incgraph.toml";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub graph: GraphSettings,
    pub format: FormatOptions,
}

/// Settings for graph building and export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub include_dirs: Vec<PathBuf>,
    /// Headers below these directories are listed but not parsed.
    pub stop_dirs: Vec<PathBuf>,
    /// Globs selecting sources when a directory is passed to `graph`.
    pub sources: Vec<String>,
    pub ignore_includes_in_conditionals: bool,
    pub colorize: bool,
    pub no_children_color: Rgb,
    pub max_children_color: Rgb,
    /// Emit folder group nodes in DGML output.
    pub folder_grouping: bool,
    pub expand_groups: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        GraphSettings {
            include_dirs: Vec::new(),
            stop_dirs: Vec::new(),
            sources: Vec::new(),
            ignore_includes_in_conditionals: false,
            colorize: true,
            no_children_color: Rgb::new(0xFF, 0xFF, 0xFF),
            max_children_color: Rgb::new(0xFF, 0x00, 0x00),
            folder_grouping: true,
            expand_groups: false,
        }
    }
}

impl Config {
    /// Load `explicit` if given, which must exist. Otherwise read
    /// [`DEFAULT_CONFIG_FILE`] from `dir` when present, else use defaults.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = dir.join(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    tracing::debug!("No {} in {}, using defaults", DEFAULT_CONFIG_FILE, dir.display());
                    return Ok(Self::default());
                }
                path
            }
        };
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
