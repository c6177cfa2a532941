//! weather-indexer CLI
//!
//! Polls the BOM observation feed and keeps the search index up to date.

#![allow(clippy::print_stdout)]

mod commands;

use std::path::PathBuf;

use application::ExportFormat;
use clap::{Parser, Subcommand, ValueEnum};
use infrastructure::{AppConfig, init_telemetry};

/// weather-indexer CLI
#[derive(Parser)]
#[command(name = "weather-indexer")]
#[command(author, version, about = "BOM observation indexer", long_about = None)]
struct Cli {
    /// Verbosity level (overrides telemetry.log_filter)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long, env = "WEATHER_INDEXER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cycles on the configured schedule until Ctrl+C
    Run,

    /// Run a single cycle
    ///
    /// Example: weather-indexer once --dry-run
    Once {
        /// Keep the document in memory and print it instead of indexing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the current local conditions from the feed
    Show,

    /// Dump stored documents
    ///
    /// Example: weather-indexer export --format bulk --output reindex.txt
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = FormatArg::Tsv)]
        format: FormatArg,

        /// Maximum number of documents, newest first
        #[arg(short, long, default_value = "100")]
        size: usize,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create the index with the observation mappings if it is missing
    InitIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// id, UTC time and apparent temperature per line
    Tsv,
    /// Re-index requests with full document sources
    Bulk,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tsv => Self::Tsv,
            FormatArg::Bulk => Self::Bulk,
        }
    }
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let mut telemetry = config.telemetry.clone();
    if let Some(filter) = log_filter_from_verbosity(cli.verbose) {
        telemetry.log_filter = filter.to_string();
    }
    init_telemetry(&telemetry)?;

    match cli.command {
        Commands::Run => commands::run(&config).await,
        Commands::Once { dry_run } => commands::once(&config, dry_run).await,
        Commands::Show => commands::show(&config).await,
        Commands::Export {
            format,
            size,
            output,
        } => commands::export(&config, format.into(), size, output.as_deref()).await,
        Commands::InitIndex => commands::init_index(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn log_filter_verbosity_zero_keeps_config() {
        assert_eq!(log_filter_from_verbosity(0), None);
    }

    #[test]
    fn log_filter_verbosity_levels() {
        assert_eq!(log_filter_from_verbosity(1), Some("info"));
        assert_eq!(log_filter_from_verbosity(2), Some("debug"));
        assert_eq!(log_filter_from_verbosity(3), Some("trace"));
        assert_eq!(log_filter_from_verbosity(10), Some("trace"));
    }

    #[test]
    fn parse_run() {
        let cli = parse(&["weather-indexer", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parse_once_dry_run() {
        let cli = parse(&["weather-indexer", "-vv", "once", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Once { dry_run: true }));
        assert_eq!(cli.verbose, 2);

        let cli = parse(&["weather-indexer", "once"]).unwrap();
        assert!(matches!(cli.command, Commands::Once { dry_run: false }));
    }

    #[test]
    fn parse_config_path() {
        let cli = parse(&["weather-indexer", "--config", "/etc/wx.toml", "show"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/wx.toml")));
        assert!(matches!(cli.command, Commands::Show));
    }

    #[test]
    fn parse_export_defaults() {
        let cli = parse(&["weather-indexer", "export"]).unwrap();
        match cli.command {
            Commands::Export {
                format,
                size,
                output,
            } => {
                assert_eq!(format, FormatArg::Tsv);
                assert_eq!(size, 100);
                assert!(output.is_none());
            },
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn parse_export_bulk_to_file() {
        let cli = parse(&[
            "weather-indexer",
            "export",
            "--format",
            "bulk",
            "--size",
            "5",
            "--output",
            "dump.txt",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                format,
                size,
                output,
            } => {
                assert_eq!(ExportFormat::from(format), ExportFormat::Bulk);
                assert_eq!(size, 5);
                assert_eq!(output, Some(PathBuf::from("dump.txt")));
            },
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn parse_rejects_unknown_format() {
        assert!(parse(&["weather-indexer", "export", "--format", "csv"]).is_err());
    }

    #[test]
    fn parse_init_index() {
        let cli = parse(&["weather-indexer", "init-index"]).unwrap();
        assert!(matches!(cli.command, Commands::InitIndex));
    }

    #[test]
    fn missing_subcommand_fails() {
        assert!(parse(&["weather-indexer"]).is_err());
    }
}
