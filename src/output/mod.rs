//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of run records
//! and single-package reports.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, print_report_csv};
pub use json_format::{print_json, print_report_json};
pub use plain::{
    print_error, print_info, print_report_detail, print_scan_header, print_success,
    print_warning,
};

use crate::cli::OutputFormat;
use crate::engine::ApkReport;
use crate::storage::RunRecord;
use std::io;

/// Format and print a run record according to the specified format.
pub fn print_record(record: &RunRecord, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(record),
        OutputFormat::Json => json_format::print_json(record),
        OutputFormat::Csv => csv_format::print_csv(record),
    }
}

/// Format and print a single package report.
pub fn print_report(report: &ApkReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_report_detail(report),
        OutputFormat::Json => json_format::print_report_json(report),
        OutputFormat::Csv => csv_format::print_report_csv(report),
    }
}
