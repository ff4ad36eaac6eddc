//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `apklens scan <path>...` - Analyze packages under paths
//! - `apklens inspect <apk>` - Detailed report for one package
//! - `apklens profiles list|create|delete` - Manage scan profiles
//! - `apklens export <run-id>` - Export a stored run
//! - `apklens history` - View scan history

mod export;
mod inspect;
mod profiles;
mod scan;

pub use export::ExportCommand;
pub use inspect::InspectCommand;
pub use profiles::ProfilesCommand;
pub use scan::ScanCommand;

use crate::error::CliResult;
use crate::output;
use crate::storage::ReportStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// apklens - classify Android packages by app framework.
///
/// apklens opens package archives (.apk, and .xapk/.apks split bundles),
/// scans their entries, and maps observed file and library signatures to a
/// framework label with a confidence score. It can analyze single files or
/// whole directory trees, and supports saved scan profiles.
#[derive(Parser, Debug)]
#[command(name = "apklens")]
#[command(author = "HueCodes <huecodes@proton.me>")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify Android packages by app framework", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // Legacy mode: if no subcommand, treat first arg as a scan path
    /// Path to scan (legacy mode, use 'apklens scan' instead)
    #[arg(value_name = "PATH", hide = true)]
    pub legacy_path: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze package files under one or more paths
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Detailed report for a single package
    #[command(alias = "i")]
    Inspect(InspectCommand),

    /// Manage scan profiles
    #[command(alias = "p")]
    Profiles(ProfilesCommand),

    /// Export a stored run
    #[command(alias = "e")]
    Export(ExportCommand),

    /// View scan history
    #[command(alias = "h")]
    History(HistoryCommand),
}

/// View and manage scan history.
#[derive(Parser, Debug)]
pub struct HistoryCommand {
    /// Number of recent runs to show
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Show detailed information for each run
    #[arg(short, long)]
    pub detailed: bool,

    /// Clear all scan history
    #[arg(long)]
    pub clear: bool,

    /// Delete runs older than N days
    #[arg(long, value_name = "DAYS")]
    pub prune: Option<u32>,
}

impl HistoryCommand {
    /// Execute the history command.
    pub fn execute(&self, _verbose: bool, quiet: bool) -> CliResult<()> {
        let store = ReportStore::new()?;

        if self.clear {
            let mut deleted = 0;
            for id in store.list_ids()? {
                store.delete(&id)?;
                deleted += 1;
            }
            if !quiet {
                output::print_success(&format!("Cleared {} stored runs", deleted));
            }
            return Ok(());
        }

        if let Some(days) = self.prune {
            let deleted = store.cleanup(chrono::Duration::days(days as i64))?;
            if !quiet {
                output::print_success(&format!(
                    "Pruned {} runs older than {} days",
                    deleted, days
                ));
            }
            return Ok(());
        }

        let records = store.list_recent(self.count)?;
        if records.is_empty() {
            if !quiet {
                println!("No stored runs.");
            }
            return Ok(());
        }

        for record in &records {
            println!(
                "{}  {}  {}",
                record.id.short(),
                record.started_at.format("%Y-%m-%d %H:%M"),
                record.summary()
            );

            if self.detailed {
                for (kind, count) in &record.kind_counts {
                    println!("          {:>4} {}", count, kind);
                }
                for failure in &record.errors {
                    println!("          failed: {} ({})", failure.file, failure.error);
                }
            }
        }

        Ok(())
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_scan() {
        let cli = Cli::parse_from(["apklens", "scan", "/tmp/apks", "--depth", "deep"]);
        match cli.command {
            Some(Commands::Scan(cmd)) => {
                assert_eq!(cmd.paths, vec!["/tmp/apks".to_string()]);
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_cli_parses_alias() {
        let cli = Cli::parse_from(["apklens", "s", "a.apk"]);
        assert!(matches!(cli.command, Some(Commands::Scan(_))));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["apklens", "-v", "history", "-n", "5"]);
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::History(cmd)) => assert_eq!(cmd.count, 5),
            _ => panic!("expected history command"),
        }
    }

    #[test]
    fn test_cli_legacy_path() {
        let cli = Cli::parse_from(["apklens", "/tmp/apks"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.legacy_path.as_deref(), Some("/tmp/apks"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Plain.to_string(), "plain");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
