//! Command-line interface for chunklens.
//!
//! Provides scriptable CLI access to record logs and their offset indexes
//! with four commands:
//! - `stats`: Aggregate counts over a record log or a persisted index
//! - `index`: Build and persist the offset index for a record log
//! - `graph`: Render a record log as a Graphviz digraph
//! - `rewrite`: Point file URLs in exported JSON documents at a local server

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::error::Result;

/// Default record log file name.
pub const DEFAULT_LOG_FILE: &str = "record.jsonl";

/// Record log and offset index analysis tools.
#[derive(Debug, Parser)]
#[command(name = "chunklens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "CHUNKLENS_OUTPUT")]
    pub output: OutputFormat,

    /// Suppress non-essential output.
    #[arg(short = 'q', long, global = true, env = "CHUNKLENS_QUIET")]
    pub quiet: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "CHUNKLENS_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json).
    #[arg(long, global = true, default_value = "text", env = "CHUNKLENS_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub const fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
}

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show aggregate statistics for a record log or index.
    #[command(alias = "stat")]
    Stats(StatsArgs),

    /// Build the offset index for a record log.
    #[command(alias = "idx")]
    Index(IndexArgs),

    /// Render a record log as a Graphviz digraph on stdout.
    #[command(alias = "viz")]
    Graph(GraphArgs),

    /// Rewrite file URLs in exported JSON documents.
    Rewrite(RewriteArgs),
}

/// Arguments for the stats command.
#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Record log (or, with --index, index) file to aggregate.
    #[arg(default_value = DEFAULT_LOG_FILE)]
    pub file: PathBuf,

    /// Treat FILE as a persisted offset index instead of a record log.
    #[arg(short = 'i', long)]
    pub index: bool,
}

/// Arguments for the index command.
#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// Record log file to index.
    #[arg(default_value = DEFAULT_LOG_FILE)]
    pub file: PathBuf,

    /// Write the index document here instead of stdout.
    #[arg(short = 'O', long = "out")]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the graph command.
#[derive(Debug, Parser)]
pub struct GraphArgs {
    /// Record log file to render.
    pub file: PathBuf,

    /// Graph name emitted in the digraph header.
    #[arg(long, default_value = "records")]
    pub name: String,
}

/// Arguments for the rewrite command.
#[derive(Debug, Parser)]
pub struct RewriteArgs {
    /// Export directory containing JSON documents and attachments.
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Base URL the rewritten file URLs should point at.
    #[arg(long, default_value = crate::rewrite::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Report what would change without writing any file.
    #[arg(long)]
    pub dry_run: bool,
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    match &cli.command {
        Commands::Stats(args) => commands::stats::run(&cli, args),
        Commands::Index(args) => commands::index::run(&cli, args),
        Commands::Graph(args) => commands::graph::run(&cli, args),
        Commands::Rewrite(args) => commands::rewrite::run(&cli, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_stats_default_file() {
        let cli = Cli::try_parse_from(["chunklens", "stats"]).unwrap();
        let Commands::Stats(args) = &cli.command else {
            panic!("expected stats command");
        };
        assert_eq!(args.file, PathBuf::from(DEFAULT_LOG_FILE));
        assert!(!args.index);
    }

    #[test]
    fn test_graph_requires_file() {
        assert!(Cli::try_parse_from(["chunklens", "graph"]).is_err());
        assert!(Cli::try_parse_from(["chunklens", "graph", "a", "b"]).is_err());
        assert!(Cli::try_parse_from(["chunklens", "graph", "record.jsonl"]).is_ok());
    }

    #[test]
    fn test_log_level_to_filter() {
        assert_eq!(LogLevel::Error.to_filter_string(), "error");
        assert_eq!(LogLevel::Trace.to_filter_string(), "trace");
    }
}
