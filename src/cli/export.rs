//! Export subcommand implementation.
//!
//! Handles the `apklens export <run-id>` command for exporting stored runs.

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::output;
use crate::storage::ReportStore;
use crate::types::{AppKind, ReportId};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// Export a stored run.
#[derive(Parser, Debug)]
pub struct ExportCommand {
    /// Run ID or prefix to export
    ///
    /// Can be a full UUID or the first few characters (short ID).
    #[arg(value_name = "RUN_ID")]
    pub run_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'o', long = "output")]
    pub output_file: Option<PathBuf>,

    /// Export only packages classified as this kind
    #[arg(short, long, value_enum)]
    pub kind: Option<AppKind>,
}

impl ExportCommand {
    /// Execute the export command.
    pub fn execute(&self, _verbose: bool, quiet: bool) -> CliResult<()> {
        let store = ReportStore::new()?;

        // Find the run by ID or prefix
        let record = if self.run_id.len() < 36 {
            // Short ID - find by prefix
            store.find_by_prefix(&self.run_id)?
        } else {
            // Full ID
            let id: ReportId = self.run_id.parse()?;
            store.load(&id)?
        };

        // Filter results if requested
        let mut record = record;
        if let Some(kind) = self.kind {
            record.reports.retain(|r| r.kind == kind);
        }

        // Generate output
        let content = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&record)
                .map_err(|e| crate::error::CliError::Other(e.to_string()))?,
            OutputFormat::Csv => generate_csv(&record)?,
            OutputFormat::Plain => generate_plain(&record),
        };

        // Write to file or stdout
        if let Some(ref path) = self.output_file {
            fs::write(path, &content).map_err(|e| {
                crate::error::CliError::Other(format!("failed to write file: {}", e))
            })?;

            if !quiet {
                output::print_success(&format!(
                    "Exported run {} to {}",
                    record.id.short(),
                    path.display()
                ));
            }
        } else {
            println!("{}", content);
        }

        Ok(())
    }
}

/// Generate CSV output.
fn generate_csv(record: &crate::storage::RunRecord) -> CliResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Write header
    wtr.write_record([
        "file",
        "package",
        "kind",
        "confidence",
        "frameworks",
        "native_libs",
        "libraries",
        "permissions",
        "duration_ms",
    ])
    .map_err(|e| crate::error::CliError::Other(e.to_string()))?;

    // Write results
    for report in &record.reports {
        let frameworks: Vec<String> = report
            .frameworks
            .iter()
            .map(|f| f.kind.to_string())
            .collect();
        let libraries: Vec<&str> = report.libraries.iter().map(|l| l.name.as_str()).collect();

        wtr.write_record([
            report.file.as_str(),
            report.package_name.as_deref().unwrap_or(""),
            &report.kind.to_string(),
            &format!("{:.2}", report.confidence),
            &frameworks.join(";"),
            &report
                .native_libraries
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(";"),
            &libraries.join(";"),
            &report
                .permissions
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(";"),
            &report.duration_ms.to_string(),
        ])
        .map_err(|e| crate::error::CliError::Other(e.to_string()))?;
    }

    String::from_utf8(
        wtr.into_inner()
            .map_err(|e| crate::error::CliError::Other(e.to_string()))?,
    )
    .map_err(|e| crate::error::CliError::Other(e.to_string()))
}

/// Generate plain text output.
fn generate_plain(record: &crate::storage::RunRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("Scan Report: {}\n", record.id));
    output.push_str(&format!("{}\n\n", "=".repeat(60)));

    output.push_str(&format!("Target:       {}\n", record.root));
    output.push_str(&format!("Depth:        {}\n", record.depth));
    output.push_str(&format!("Started:      {}\n", record.started_at));
    output.push_str(&format!("Completed:    {}\n", record.completed_at));
    output.push_str(&format!("Duration:     {} ms\n\n", record.duration_ms));

    output.push_str(&format!(
        "Summary: {} packages analyzed, {} failed\n\n",
        record.packages_scanned, record.failures
    ));

    if !record.reports.is_empty() {
        output.push_str("Results:\n");
        output.push_str(&format!("{}\n", "-".repeat(60)));
        output.push_str(&format!(
            "{:<30}  {:<18}  {:>5}  {}\n",
            "FILE", "KIND", "CONF", "PACKAGE"
        ));
        output.push_str(&format!("{}\n", "-".repeat(60)));

        for report in &record.reports {
            let file_display = if report.file.chars().count() > 30 {
                let head: String = report.file.chars().take(27).collect();
                format!("{}...", head)
            } else {
                report.file.clone()
            };

            output.push_str(&format!(
                "{:<30}  {:<18}  {:>4.0}%  {}\n",
                file_display,
                report.kind.to_string(),
                report.confidence * 100.0,
                report.package_name.as_deref().unwrap_or("-")
            ));
        }
    }

    output
}
