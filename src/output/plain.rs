//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::engine::ApkReport;
use crate::storage::RunRecord;
use crate::types::AppKind;
use console::{style, Style};
use std::io::{self, Write};

/// Print a run record in human-readable plain text format.
pub fn print_plain(record: &RunRecord) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Header
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    )?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("apklens").cyan().bold()
    )?;
    writeln!(
        out,
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    )?;
    writeln!(out)?;

    // Run info
    writeln!(out, "  {} {}", style("Target:").bold(), record.root)?;
    writeln!(out, "  {} {}", style("Depth:").bold(), record.depth)?;
    writeln!(
        out,
        "  {} {}",
        style("Run ID:").bold(),
        style(record.id.short()).dim()
    )?;
    writeln!(out)?;

    // Statistics
    writeln!(
        out,
        "  {} {} packages analyzed in {:.2}s",
        style("Statistics:").bold(),
        record.packages_scanned,
        record.duration_ms as f64 / 1000.0
    )?;
    if record.failures > 0 {
        writeln!(
            out,
            "               {} failed",
            style(record.failures).red().bold()
        )?;
    }
    for (kind, count) in &record.kind_counts {
        writeln!(
            out,
            "               {:>4} {}",
            style(count).green().bold(),
            kind
        )?;
    }
    writeln!(out)?;

    // Package table
    if record.reports.is_empty() {
        writeln!(out, "  {}", style("No packages to display.").dim())?;
    } else {
        writeln!(
            out,
            "  {}",
            style("───────────────────────────────────────────────────────────────").dim()
        )?;
        writeln!(
            out,
            "  {:<28}  {:<18}  {:>5}  {:>4}  {:>4}",
            style("FILE").bold(),
            style("KIND").bold(),
            style("CONF").bold(),
            style("FWKS").bold(),
            style("LIBS").bold()
        )?;
        writeln!(
            out,
            "  {}",
            style("───────────────────────────────────────────────────────────────").dim()
        )?;

        for report in &record.reports {
            writeln!(
                out,
                "  {:<28}  {:<18}  {:>4.0}%  {:>4}  {:>4}",
                truncate_string(&report.file, 28),
                kind_style(report.kind).apply_to(report.kind.to_string()),
                report.confidence * 100.0,
                report.frameworks.len(),
                report.libraries.len()
            )?;
        }

        writeln!(
            out,
            "  {}",
            style("───────────────────────────────────────────────────────────────").dim()
        )?;
    }

    // Failures
    if !record.errors.is_empty() {
        writeln!(out)?;
        for failure in &record.errors {
            writeln!(
                out,
                "  {} {}: {}",
                style("✗").red().bold(),
                failure.file,
                style(&failure.error).dim()
            )?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    )?;
    writeln!(out)?;

    Ok(())
}

/// Print a detailed single-package report.
pub fn print_report_detail(report: &ApkReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(out, "  {} {}", style("File:").bold(), report.path.display())?;
    if let Some(ref package) = report.package_name {
        writeln!(out, "  {} {}", style("Package:").bold(), package)?;
    }
    writeln!(
        out,
        "  {} {} ({:.0}% confidence)",
        style("Kind:").bold(),
        kind_style(report.kind).apply_to(report.kind.to_string()),
        report.confidence * 100.0
    )?;
    writeln!(
        out,
        "  {} {} entries, {:.1} MiB{}",
        style("Archive:").bold(),
        report.entries_scanned,
        report.size_bytes as f64 / (1024.0 * 1024.0),
        if report.has_dex { ", dex present" } else { "" }
    )?;
    if let Some(ref digest) = report.digest {
        writeln!(out, "  {} {}", style("BLAKE3:").bold(), style(digest).dim())?;
    }
    if let Some(stats) = report.archive_stats {
        writeln!(
            out,
            "  {} {:.1} MiB compressed, {:.1} MiB uncompressed",
            style("Entries:").bold(),
            stats.compressed_bytes as f64 / (1024.0 * 1024.0),
            stats.uncompressed_bytes as f64 / (1024.0 * 1024.0)
        )?;
    }

    if !report.frameworks.is_empty() {
        writeln!(out)?;
        writeln!(out, "  {}", style("Frameworks:").bold())?;
        for hit in &report.frameworks {
            writeln!(
                out,
                "    {} {} ({})",
                style("•").dim(),
                hit.kind,
                style(hit.markers.join(", ")).dim()
            )?;
        }
    }

    if !report.abis.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "  {} {}",
            style("ABIs:").bold(),
            report.abis.join(", ")
        )?;
    }

    if !report.native_libraries.is_empty() {
        writeln!(out, "  {}", style("Native libraries:").bold())?;
        for lib in &report.native_libraries {
            writeln!(out, "    {} {}", style("•").dim(), lib)?;
        }
    }

    if !report.libraries.is_empty() {
        writeln!(out)?;
        writeln!(out, "  {}", style("Inferred libraries:").bold())?;
        for hit in &report.libraries {
            writeln!(
                out,
                "    {} {:<32} {}",
                style("•").dim(),
                hit.name,
                style(truncate_string(&hit.evidence, 40)).dim()
            )?;
        }
    }

    if !report.permissions.is_empty() {
        writeln!(out)?;
        writeln!(out, "  {}", style("Permissions:").bold())?;
        for permission in &report.permissions {
            writeln!(out, "    {} {}", style("•").dim(), permission)?;
        }
    }

    writeln!(out)?;
    Ok(())
}

/// Print a scan header before analysis begins.
pub fn print_scan_header(root: &str, depth: &str, packages: usize) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("apklens").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Depth: {}", style("•").dim(), style(depth).yellow());
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(root).white().bold()
    );
    println!(
        "{} Analyzing {} packages...",
        style("•").dim(),
        style(packages).white().bold()
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Color for a framework label.
fn kind_style(kind: AppKind) -> Style {
    match kind {
        AppKind::Native => Style::new().white(),
        AppKind::Unknown => Style::new().red(),
        _ => Style::new().green().bold(),
    }
}

/// Truncate a string to a maximum number of characters, adding ellipsis if
/// truncated. Counts chars, not bytes; file names are arbitrary UTF-8.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Evidence;
    use crate::engine::AnalysisDepth;
    use crate::storage::RunRecord;
    use crate::types::ApkFile;
    use std::path::Path;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_string_multibyte() {
        // Never splits inside a multibyte char.
        let name = "アプリケーション例デモアプリケーション例デモアプリケーション例デモ.apk";
        let truncated = truncate_string(name, 8);
        assert_eq!(truncated.chars().count(), 8);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_string("アプリ.apk", 28), "アプリ.apk");
    }

    #[test]
    fn test_print_plain_multibyte_file_name() {
        // Long enough to hit the table's truncation width.
        let name = "アプリケーション例デモアプリケーション例デモアプリケーション例デモ.apk";
        let mut evidence = Evidence::default();
        evidence.observe("classes.dex", true);
        let file = ApkFile {
            path: Path::new("/tmp").join(name),
            file_name: name.to_string(),
            size_bytes: 1024,
            modified: None,
        };
        let report = crate::engine::ApkReport::from_evidence(&file, &evidence);

        let record = RunRecord::new("/tmp", AnalysisDepth::Standard).finalize(
            crate::engine::BatchOutcome {
                reports: vec![report],
                failures: Vec::new(),
                duration_ms: 1,
            },
        );

        print_plain(&record).unwrap();
    }
}
