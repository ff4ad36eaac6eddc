//! CSV output formatting.

use crate::engine::ApkReport;
use crate::storage::RunRecord;
use std::io;

const HEADER: [&str; 9] = [
    "file",
    "package",
    "kind",
    "confidence",
    "frameworks",
    "native_libs",
    "libraries",
    "permissions",
    "duration_ms",
];

/// Print a run record in CSV format, one row per package.
pub fn print_csv(record: &RunRecord) -> io::Result<()> {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    wtr.write_record(HEADER)?;
    for report in &record.reports {
        write_report_row(&mut wtr, report)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Print a single package report as a CSV header plus one row.
pub fn print_report_csv(report: &ApkReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    wtr.write_record(HEADER)?;
    write_report_row(&mut wtr, report)?;

    wtr.flush()?;
    Ok(())
}

fn write_report_row<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    report: &ApkReport,
) -> io::Result<()> {
    let frameworks = report
        .frameworks
        .iter()
        .map(|h| h.kind.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    wtr.write_record([
        report.file.as_str(),
        report.package_name.as_deref().unwrap_or(""),
        &report.kind.to_string(),
        &format!("{:.2}", report.confidence),
        &frameworks,
        &report.native_libraries.len().to_string(),
        &report.libraries.len().to_string(),
        &report.permissions.len().to_string(),
        &report.duration_ms.to_string(),
    ])?;

    Ok(())
}
