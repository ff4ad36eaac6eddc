//! Analysis engine - coordinates package analyzers over batches of files.
//!
//! This module provides a unified interface for analyzing single archives
//! and split bundles, managing concurrent analysis tasks on the tokio
//! runtime with bounded concurrency.

mod archive;
mod bundle;
mod traits;

pub use archive::ArchiveAnalyzer;
pub use bundle::BundleAnalyzer;
pub use traits::{
    analyzer_for, AnalysisDepth, AnalyzeOptions, ApkReport, ArchiveStats, BoxedAnalyzer,
    PackageAnalyzer, PackageKind,
};

use crate::error::AnalyzeResult;
use crate::types::ApkFile;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::warn;

/// One package that could not be analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    /// File name of the failed package.
    pub file: String,
    /// The analysis error, rendered.
    pub error: String,
}

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Maximum number of packages analyzed at once.
    pub concurrency: usize,
    /// Abort on the first failed package instead of carrying it.
    pub fail_fast: bool,
    /// Show a progress bar while analyzing.
    pub progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            fail_fast: false,
            progress: false,
        }
    }
}

/// The outcome of analyzing a batch of packages.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Successful reports, sorted by lowercased file name.
    pub reports: Vec<ApkReport>,
    /// Packages that failed to analyze (keep-going mode).
    pub failures: Vec<FileFailure>,
    /// Wall-clock batch duration in milliseconds.
    pub duration_ms: u64,
}

/// Analyze a batch of package files with bounded concurrency.
///
/// Each analysis runs its blocking zip work on the tokio blocking pool; the
/// semaphore bounds how many run at once. In the default keep-going mode a
/// failed package becomes a [`FileFailure`] in the outcome; with
/// `fail_fast` the first failure aborts the batch.
pub async fn run_batch(
    files: Vec<ApkFile>,
    options: AnalyzeOptions,
    config: BatchConfig,
) -> AnalyzeResult<BatchOutcome> {
    let start = Instant::now();
    let total = files.len();

    let progress = if config.progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));

    let task_progress = progress.clone();
    let mut stream = stream::iter(files)
        .map(move |file| {
            let sem = Arc::clone(&semaphore);
            let options = options.clone();
            let progress = task_progress.clone();

            async move {
                let _permit = sem.acquire().await.expect("semaphore closed");

                let analyzer = analyzer_for(&file.path, options);
                let result = analyzer.analyze(&file).await;

                if let Some(ref pb) = progress {
                    pb.inc(1);
                    if let Ok(ref report) = result {
                        pb.set_message(format!("{}: {}", report.file, report.kind));
                    }
                }

                (file, result)
            }
        })
        // High buffering; the semaphore controls actual concurrency.
        .buffer_unordered(64);

    let mut reports = Vec::with_capacity(total);
    let mut failures = Vec::new();

    while let Some((file, result)) = stream.next().await {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                if config.fail_fast {
                    if let Some(pb) = progress {
                        pb.abandon_with_message("aborted");
                    }
                    return Err(e);
                }
                warn!(file = %file.file_name, "analysis failed: {}", e);
                failures.push(FileFailure {
                    file: file.file_name,
                    error: e.to_string(),
                });
            }
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("Analysis complete");
    }

    // Concurrent completion scrambles order; restore the enumeration sort.
    reports.sort_by_key(|r| r.file.to_lowercase());
    failures.sort_by_key(|f| f.file.to_lowercase());

    Ok(BatchOutcome {
        reports,
        failures,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::Path;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_apk(path: &Path, entries: &[&str]) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options: FileOptions = FileOptions::default();
        for entry in entries {
            writer.start_file(*entry, options).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_batch_keeps_going_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        write_apk(&dir.path().join("good.apk"), &["classes.dex"]);
        std::fs::write(dir.path().join("bad.apk"), b"not a zip").unwrap();

        let files = vec![
            ApkFile::from_path(&dir.path().join("good.apk")).unwrap(),
            ApkFile::from_path(&dir.path().join("bad.apk")).unwrap(),
        ];

        let outcome = run_batch(files, AnalyzeOptions::default(), BatchConfig::default())
            .await
            .unwrap();

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file, "bad.apk");
    }

    #[tokio::test]
    async fn test_batch_fail_fast_aborts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.apk"), b"not a zip").unwrap();

        let files = vec![ApkFile::from_path(&dir.path().join("bad.apk")).unwrap()];
        let config = BatchConfig {
            fail_fast: true,
            ..Default::default()
        };

        let result = run_batch(files, AnalyzeOptions::default(), config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_batch_results_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zeta.apk", "Alpha.apk", "mid.apk"] {
            write_apk(&dir.path().join(name), &["classes.dex"]);
        }

        let files: Vec<ApkFile> = ["zeta.apk", "Alpha.apk", "mid.apk"]
            .iter()
            .map(|n| ApkFile::from_path(&dir.path().join(n)).unwrap())
            .collect();

        let config = BatchConfig {
            concurrency: 3,
            ..Default::default()
        };
        let outcome = run_batch(files, AnalyzeOptions::default(), config)
            .await
            .unwrap();

        let names: Vec<&str> = outcome.reports.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(names, ["Alpha.apk", "mid.apk", "zeta.apk"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcome = run_batch(Vec::new(), AnalyzeOptions::default(), BatchConfig::default())
            .await
            .unwrap();
        assert!(outcome.reports.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
