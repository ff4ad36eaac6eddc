//! JSON-based run storage.
//!
//! Stores each scan run as a separate JSON file for simplicity and
//! durability. Supports listing, querying, and exporting run records.

use crate::config::Paths;
use crate::engine::{AnalysisDepth, ApkReport, BatchOutcome, FileFailure};
use crate::error::{StorageError, StorageResult};
use crate::types::{AppKind, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// A persisted scan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique identifier for this run.
    pub id: ReportId,
    /// When the run was started.
    pub started_at: DateTime<Utc>,
    /// When the run completed.
    pub completed_at: DateTime<Utc>,
    /// What the user asked to scan (paths as given).
    pub root: String,
    /// Analysis depth used.
    pub depth: String,
    /// Number of packages successfully analyzed.
    pub packages_scanned: usize,
    /// Packages that failed to analyze.
    pub failures: usize,
    /// Per-kind package counts.
    pub kind_counts: BTreeMap<AppKind, usize>,
    /// Total run duration in milliseconds.
    pub duration_ms: u64,
    /// Individual package reports.
    pub reports: Vec<ApkReport>,
    /// Individual failures.
    pub errors: Vec<FileFailure>,
}

impl RunRecord {
    /// Create a new run record.
    pub fn new(root: impl Into<String>, depth: AnalysisDepth) -> Self {
        Self {
            id: ReportId::new(),
            started_at: Utc::now(),
            completed_at: Utc::now(),
            root: root.into(),
            depth: depth.to_string(),
            packages_scanned: 0,
            failures: 0,
            kind_counts: BTreeMap::new(),
            duration_ms: 0,
            reports: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Finalize the run record with a batch outcome.
    pub fn finalize(mut self, outcome: BatchOutcome) -> Self {
        self.completed_at = Utc::now();
        self.duration_ms = outcome.duration_ms;
        self.packages_scanned = outcome.reports.len();
        self.failures = outcome.failures.len();

        for report in &outcome.reports {
            *self.kind_counts.entry(report.kind).or_insert(0) += 1;
        }

        self.reports = outcome.reports;
        self.errors = outcome.failures;
        self
    }

    /// Get a short summary of the run.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} packages, {} failed [{:.2}s]",
            self.root,
            self.packages_scanned,
            self.failures,
            self.duration_ms as f64 / 1000.0
        )
    }
}

/// JSON file-based run storage.
pub struct ReportStore {
    runs_dir: PathBuf,
}

impl ReportStore {
    /// Create a new store in the default data directory.
    pub fn new() -> StorageResult<Self> {
        let paths = Paths::get();
        Self::with_dir(paths.runs_dir())
    }

    /// Create a store over a specific directory.
    pub fn with_dir(runs_dir: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&runs_dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        Ok(Self { runs_dir })
    }

    /// Save a run record.
    pub fn save(&self, record: &RunRecord) -> StorageResult<()> {
        let file = self.run_file(&record.id);
        let content = serde_json::to_string_pretty(record)?;

        fs::write(&file, content).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Load a run record by ID.
    pub fn load(&self, id: &ReportId) -> StorageResult<RunRecord> {
        let file = self.run_file(id);

        if !file.exists() {
            return Err(StorageError::RunNotFound(id.to_string()));
        }

        let content =
            fs::read_to_string(&file).map_err(|e| StorageError::LoadFailed(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| StorageError::LoadFailed(e.to_string()))
    }

    /// Find a run by short ID prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> StorageResult<RunRecord> {
        let matches: Vec<_> = self
            .list_ids()?
            .into_iter()
            .filter(|id| id.to_string().starts_with(prefix))
            .collect();

        match matches.len() {
            0 => Err(StorageError::RunNotFound(prefix.to_string())),
            1 => self.load(&matches[0]),
            n => Err(StorageError::AmbiguousPrefix(prefix.to_string(), n)),
        }
    }

    /// List all run IDs.
    pub fn list_ids(&self) -> StorageResult<Vec<ReportId>> {
        let mut ids = Vec::new();

        for entry in
            fs::read_dir(&self.runs_dir).map_err(|e| StorageError::DirectoryError(e.to_string()))?
        {
            let entry = entry.map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            let path = entry.path();

            if path.extension().map_or(false, |ext| ext == "json") {
                if let Some(stem) = path.file_stem() {
                    if let Ok(id) = stem.to_string_lossy().parse::<ReportId>() {
                        ids.push(id);
                    }
                }
            }
        }

        Ok(ids)
    }

    /// List all run records, most recent first.
    pub fn list(&self) -> StorageResult<Vec<RunRecord>> {
        let ids = self.list_ids()?;
        let mut records = Vec::new();

        for id in ids {
            if let Ok(record) = self.load(&id) {
                records.push(record);
            }
        }

        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        Ok(records)
    }

    /// List recent runs (last n).
    pub fn list_recent(&self, count: usize) -> StorageResult<Vec<RunRecord>> {
        let mut records = self.list()?;
        records.truncate(count);
        Ok(records)
    }

    /// Delete a run record.
    pub fn delete(&self, id: &ReportId) -> StorageResult<()> {
        let file = self.run_file(id);

        if !file.exists() {
            return Err(StorageError::RunNotFound(id.to_string()));
        }

        fs::remove_file(&file).map_err(|e| StorageError::SaveFailed(e.to_string()))
    }

    /// Delete runs older than a given duration. Returns the count deleted.
    pub fn cleanup(&self, max_age: chrono::Duration) -> StorageResult<usize> {
        let cutoff = Utc::now() - max_age;
        let mut deleted = 0;

        for record in self.list()? {
            if record.started_at < cutoff {
                self.delete(&record.id)?;
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    /// Get the file path for a run.
    fn run_file(&self, id: &ReportId) -> PathBuf {
        self.runs_dir.join(format!("{}.json", id))
    }

    /// Get storage statistics.
    pub fn stats(&self) -> StorageResult<StorageStats> {
        let records = self.list()?;
        let total_size: u64 = self
            .list_ids()?
            .iter()
            .filter_map(|id| fs::metadata(self.run_file(id)).ok())
            .map(|m| m.len())
            .sum();

        Ok(StorageStats {
            run_count: records.len(),
            total_size_bytes: total_size,
            oldest_run: records.last().map(|r| r.started_at),
            newest_run: records.first().map(|r| r.started_at),
        })
    }
}

/// Storage statistics.
#[derive(Debug, Clone)]
pub struct StorageStats {
    /// Number of stored runs.
    pub run_count: usize,
    /// Total size in bytes.
    pub total_size_bytes: u64,
    /// Oldest run timestamp.
    pub oldest_run: Option<DateTime<Utc>>,
    /// Newest run timestamp.
    pub newest_run: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::Evidence;
    use crate::types::ApkFile;
    use std::path::Path;

    fn sample_report(name: &str, entries: &[&str]) -> ApkReport {
        let mut evidence = Evidence::default();
        for entry in entries {
            evidence.observe(entry, true);
        }
        let file = ApkFile {
            path: Path::new("/tmp").join(name),
            file_name: name.to_string(),
            size_bytes: 1024,
            modified: None,
        };
        ApkReport::from_evidence(&file, &evidence)
    }

    fn sample_outcome() -> BatchOutcome {
        BatchOutcome {
            reports: vec![
                sample_report("a.apk", &["assets/flutter_assets/x", "classes.dex"]),
                sample_report("b.apk", &["classes.dex"]),
            ],
            failures: vec![FileFailure {
                file: "c.apk".to_string(),
                error: "not a zip".to_string(),
            }],
            duration_ms: 42,
        }
    }

    #[test]
    fn test_run_record_finalize() {
        let record =
            RunRecord::new("/apks", AnalysisDepth::Standard).finalize(sample_outcome());

        assert_eq!(record.packages_scanned, 2);
        assert_eq!(record.failures, 1);
        assert_eq!(record.kind_counts[&AppKind::Flutter], 1);
        assert_eq!(record.kind_counts[&AppKind::Native], 1);
        assert_eq!(record.duration_ms, 42);
    }

    #[test]
    fn test_run_record_serialization() {
        let record = RunRecord::new("/apks", AnalysisDepth::Deep).finalize(sample_outcome());
        let json = serde_json::to_string(&record).unwrap();
        let parsed: RunRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.root, record.root);
        assert_eq!(parsed.kind_counts, record.kind_counts);
    }

    #[test]
    fn test_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::with_dir(dir.path().to_path_buf()).unwrap();

        let record = RunRecord::new("/apks", AnalysisDepth::Standard).finalize(sample_outcome());
        store.save(&record).unwrap();

        let loaded = store.load(&record.id).unwrap();
        assert_eq!(loaded.packages_scanned, record.packages_scanned);
        assert_eq!(loaded.errors.len(), 1);
    }

    #[test]
    fn test_find_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::with_dir(dir.path().to_path_buf()).unwrap();

        let record = RunRecord::new("/apks", AnalysisDepth::Standard);
        store.save(&record).unwrap();

        let found = store.find_by_prefix(&record.id.short()).unwrap();
        assert_eq!(found.id, record.id);

        assert!(matches!(
            store.find_by_prefix("zzzzzzzz"),
            Err(StorageError::RunNotFound(_))
        ));
    }

    #[test]
    fn test_list_recent_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::with_dir(dir.path().to_path_buf()).unwrap();

        let mut old = RunRecord::new("/old", AnalysisDepth::Quick);
        old.started_at = Utc::now() - chrono::Duration::days(3);
        let new = RunRecord::new("/new", AnalysisDepth::Quick);

        store.save(&old).unwrap();
        store.save(&new).unwrap();

        let records = store.list_recent(10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].root, "/new");

        let records = store.list_recent(1).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_cleanup_deletes_old_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::with_dir(dir.path().to_path_buf()).unwrap();

        let mut old = RunRecord::new("/old", AnalysisDepth::Quick);
        old.started_at = Utc::now() - chrono::Duration::days(30);
        let new = RunRecord::new("/new", AnalysisDepth::Quick);

        store.save(&old).unwrap();
        store.save(&new).unwrap();

        let deleted = store.cleanup(chrono::Duration::days(7)).unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_stats() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::with_dir(dir.path().to_path_buf()).unwrap();

        assert_eq!(store.stats().unwrap().run_count, 0);

        store
            .save(&RunRecord::new("/apks", AnalysisDepth::Standard))
            .unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.run_count, 1);
        assert!(stats.total_size_bytes > 0);
    }
}
