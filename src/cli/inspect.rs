//! Inspect subcommand implementation.
//!
//! Handles the `apklens inspect <apk>` command for a detailed single-package
//! report.

use crate::cli::OutputFormat;
use crate::engine::{analyzer_for, AnalysisDepth, AnalyzeOptions, BatchOutcome};
use crate::error::CliResult;
use crate::output;
use crate::storage::{ReportStore, RunRecord};
use crate::types::{ApkFile, InputSpec, TargetError};
use clap::Parser;
use std::path::Path;

/// Detailed report for a single package.
#[derive(Parser, Debug)]
pub struct InspectCommand {
    /// Package file to inspect (.apk, .xapk, or .apks)
    #[arg(value_name = "APK")]
    pub apk: String,

    /// Analysis depth
    #[arg(short, long, value_enum, default_value = "deep")]
    pub depth: AnalysisDepth,

    /// Output format for the report
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Save the report as a one-package run
    #[arg(long)]
    pub save: bool,
}

impl InspectCommand {
    /// Execute the inspect command.
    pub async fn execute(&self, _verbose: bool, quiet: bool) -> CliResult<()> {
        let path = Path::new(&self.apk);
        let spec = InputSpec::parse(&self.apk)?;
        let file = match spec {
            InputSpec::File(_) => ApkFile::from_path(path).map_err(|e| {
                TargetError::Unreadable {
                    path: self.apk.clone(),
                    reason: e.to_string(),
                }
            })?,
            InputSpec::Dir(_) => {
                return Err(crate::error::CliError::Other(format!(
                    "'{}' is a directory, use 'apklens scan' for directories",
                    self.apk
                )))
            }
        };

        let options = AnalyzeOptions::default().with_depth(self.depth);
        let analyzer = analyzer_for(path, options);
        let start = std::time::Instant::now();
        let report = analyzer.analyze(&file).await?;

        if self.save {
            let outcome = BatchOutcome {
                reports: vec![report.clone()],
                failures: Vec::new(),
                duration_ms: start.elapsed().as_millis() as u64,
            };
            let record = RunRecord::new(self.apk.clone(), self.depth).finalize(outcome);
            let store = ReportStore::new()?;
            store.save(&record)?;
            if !quiet && self.output == OutputFormat::Plain {
                output::print_info(&format!("Run saved with ID: {}", record.id.short()));
            }
        }

        output::print_report(&report, self.output)?;

        Ok(())
    }
}
