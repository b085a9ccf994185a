//! incgraph CLI entry point

use clap::{Args, Parser, Subcommand};
use incgraph_indexer::TraceSyntax;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{DirArgs, ExportArgs};
use config::Config;

#[derive(Parser)]
#[command(name = "incgraph")]
#[command(about = "C/C++ include graph analysis and include formatting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./incgraph.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args, Default)]
struct DirFlags {
    /// Include search directory, tried in order after the file's own directory
    #[arg(short = 'I', long = "include-dir")]
    include_dirs: Vec<PathBuf>,

    /// Do not parse headers below this directory
    #[arg(long = "stop-at")]
    stop_dirs: Vec<PathBuf>,
}

impl From<DirFlags> for DirArgs {
    fn from(flags: DirFlags) -> Self {
        DirArgs {
            include_dirs: flags.include_dirs,
            stop_dirs: flags.stop_dirs,
        }
    }
}

#[derive(Args, Default)]
struct ExportFlags {
    /// Write the graph as DGML
    #[arg(long)]
    dgml: Option<PathBuf>,

    /// Write the graph as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl From<ExportFlags> for ExportArgs {
    fn from(flags: ExportFlags) -> Self {
        ExportArgs {
            dgml: flags.dgml,
            json: flags.json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the include graph of source files or directories
    Graph {
        /// Source files, or directories searched for sources
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        dirs: DirFlags,

        #[command(flatten)]
        export: ExportFlags,

        /// List the N files with the most unique transitive includes
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        /// Label files relative to the include directories
        #[arg(long)]
        relative: bool,
    },
    /// Build the include graph from a compiler include trace
    Trace {
        /// File with captured compiler output
        trace_file: PathBuf,

        /// The translation unit the trace was produced for
        #[arg(long)]
        root: PathBuf,

        /// Trace format: show-includes, gcc or tabs
        #[arg(long, default_value = "show-includes")]
        syntax: TraceSyntax,

        #[command(flatten)]
        export: ExportFlags,
    },
    /// Show the files included by a file, grouped by folder
    Tree {
        file: PathBuf,

        #[command(flatten)]
        dirs: DirFlags,

        /// Show the include hierarchy instead of folders
        #[arg(long)]
        hierarchy: bool,
    },
    /// Sort and normalize the include block of source files
    Format {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Include search directory used for path rewriting
        #[arg(short = 'I', long = "include-dir")]
        include_dirs: Vec<PathBuf>,

        /// Rewrite files instead of printing the result
        #[arg(short, long)]
        in_place: bool,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "incgraph={0},incgraph_core={0},incgraph_indexer={0},incgraph_format={0}",
            log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Commands::Version = cli.command {
        println!("incgraph v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let config = Config::load(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Graph {
            inputs,
            dirs,
            export,
            top,
            relative,
        } => commands::graph(inputs, dirs.into(), export.into(), top, relative, &config).await,
        Commands::Trace {
            trace_file,
            root,
            syntax,
            export,
        } => commands::trace(trace_file, root, syntax, export.into(), &config).await,
        Commands::Tree { file, dirs, hierarchy } => commands::tree(file, dirs.into(), hierarchy, &config).await,
        Commands::Format {
            files,
            include_dirs,
            in_place,
        } => commands::format(files, include_dirs, in_place, &config),
        Commands::Version => Ok(()),
    }
}
