//! JSON output formatting.

use crate::engine::ApkReport;
use crate::storage::RunRecord;
use std::io;

/// Print a run record in JSON format.
pub fn print_json(record: &RunRecord) -> io::Result<()> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!("{}", json);
    Ok(())
}

/// Print a single package report in JSON format.
pub fn print_report_json(report: &ApkReport) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!("{}", json);
    Ok(())
}
