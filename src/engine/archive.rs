//! Single-archive analyzer.
//!
//! Opens one `.apk` as a zip, feeds every entry name through the detectors,
//! and at deeper settings reads the manifest and digests the file. The
//! blocking zip work runs on the tokio blocking pool so batch drivers and
//! single-package commands both stay off the async worker threads.

use crate::detect::Evidence;
use crate::engine::traits::{
    AnalysisDepth, AnalyzeOptions, ApkReport, ArchiveStats, PackageAnalyzer, PackageKind,
};
use crate::error::{AnalyzeError, AnalyzeResult};
use crate::manifest;
use crate::types::ApkFile;
use async_trait::async_trait;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::debug;
use zip::ZipArchive;

/// Manifest entry name inside an APK.
const MANIFEST_ENTRY: &str = "AndroidManifest.xml";

/// Largest manifest read into memory. Real manifests are tens of KiB;
/// anything bigger is not worth string-scanning.
const MANIFEST_SIZE_CAP: u64 = 8 * 1024 * 1024;

/// Analyzer for single `.apk` archives.
pub struct ArchiveAnalyzer {
    options: AnalyzeOptions,
}

impl ArchiveAnalyzer {
    pub fn new(options: AnalyzeOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl PackageAnalyzer for ArchiveAnalyzer {
    fn package_kind(&self) -> PackageKind {
        PackageKind::Apk
    }

    fn depth(&self) -> AnalysisDepth {
        self.options.depth
    }

    async fn analyze(&self, file: &ApkFile) -> AnalyzeResult<ApkReport> {
        let options = self.options.clone();
        let path = file.path.clone();
        let file = file.clone();

        tokio::task::spawn_blocking(move || scan_archive(&file, &options))
            .await
            .map_err(|e| AnalyzeError::OpenFailed {
                path,
                reason: format!("analysis task failed: {}", e),
            })?
    }
}

/// Synchronous scan of one archive.
pub(crate) fn scan_archive(file: &ApkFile, options: &AnalyzeOptions) -> AnalyzeResult<ApkReport> {
    let start = Instant::now();

    let handle = File::open(&file.path).map_err(|e| AnalyzeError::OpenFailed {
        path: file.path.clone(),
        reason: e.to_string(),
    })?;
    let mut archive = ZipArchive::new(handle).map_err(|e| AnalyzeError::BadArchive {
        path: file.path.clone(),
        reason: e.to_string(),
    })?;

    let mut evidence = Evidence::default();
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    for name in &names {
        evidence.observe(name, options.infer_libraries);
    }

    let mut report = ApkReport::from_evidence(file, &evidence);

    if options.depth >= AnalysisDepth::Standard && options.read_permissions {
        if let Some(bytes) = read_manifest(&mut archive)? {
            report.permissions = manifest::extract_permissions(&bytes);
            report.package_name = manifest::guess_package_name(&bytes);
        }
    }

    if options.depth == AnalysisDepth::Deep {
        report.digest = Some(digest_file(&file.path)?);
        report.archive_stats = Some(entry_stats(&mut archive));
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        file = %file.file_name,
        kind = %report.kind,
        markers = report.frameworks.len(),
        duration_ms = report.duration_ms,
        "archive scanned"
    );

    Ok(report)
}

/// Read the manifest entry, if present and under the size cap.
fn read_manifest<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
) -> AnalyzeResult<Option<Vec<u8>>> {
    let mut entry = match archive.by_name(MANIFEST_ENTRY) {
        Ok(entry) => entry,
        Err(_) => return Ok(None),
    };

    if entry.size() > MANIFEST_SIZE_CAP {
        debug!(size = entry.size(), "manifest over size cap, skipping");
        return Ok(None);
    }

    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| AnalyzeError::EntryReadFailed {
            entry: MANIFEST_ENTRY.to_string(),
            reason: e.to_string(),
        })?;

    Ok(Some(bytes))
}

/// Stream the whole file through BLAKE3.
pub(crate) fn digest_file(path: &Path) -> AnalyzeResult<String> {
    let mut file = File::open(path).map_err(|e| AnalyzeError::OpenFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let mut hasher = blake3::Hasher::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Total compressed and uncompressed entry sizes.
pub(crate) fn entry_stats<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> ArchiveStats {
    let mut stats = ArchiveStats {
        compressed_bytes: 0,
        uncompressed_bytes: 0,
    };

    for i in 0..archive.len() {
        if let Ok(entry) = archive.by_index_raw(i) {
            stats.compressed_bytes += entry.compressed_size();
            stats.uncompressed_bytes += entry.size();
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Build a fixture APK with the given entry names (empty bodies unless
    /// a body is supplied for the manifest).
    fn write_fixture_apk(path: &Path, entries: &[&str], manifest: Option<&[u8]>) {
        let file = File::create(path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options: FileOptions = FileOptions::default();

        for entry in entries {
            writer.start_file(*entry, options).unwrap();
        }
        if let Some(bytes) = manifest {
            writer.start_file(MANIFEST_ENTRY, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    fn utf16_bytes(strings: &[&str]) -> Vec<u8> {
        let mut data = Vec::new();
        for s in strings {
            for unit in s.encode_utf16() {
                data.extend_from_slice(&unit.to_le_bytes());
            }
            data.extend_from_slice(&[0x00, 0x00]);
        }
        data
    }

    #[tokio::test]
    async fn test_flutter_shaped_apk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flutter.apk");
        write_fixture_apk(
            &path,
            &[
                "assets/flutter_assets/AssetManifest.json",
                "lib/arm64-v8a/libflutter.so",
                "classes.dex",
            ],
            None,
        );

        let file = ApkFile::from_path(&path).unwrap();
        let analyzer = ArchiveAnalyzer::new(AnalyzeOptions::default());
        let report = analyzer.analyze(&file).await.unwrap();

        assert_eq!(report.kind, crate::types::AppKind::Flutter);
        assert_eq!(report.confidence, 0.9);
        assert!(report.has_dex);
        assert_eq!(report.entries_scanned, 3);
        assert_eq!(report.abis, vec!["arm64-v8a".to_string()]);
    }

    #[tokio::test]
    async fn test_plain_native_apk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("native.apk");
        write_fixture_apk(&path, &["classes.dex", "res/layout/main.xml"], None);

        let file = ApkFile::from_path(&path).unwrap();
        let analyzer = ArchiveAnalyzer::new(AnalyzeOptions::default());
        let report = analyzer.analyze(&file).await.unwrap();

        assert_eq!(report.kind, crate::types::AppKind::Native);
        assert_eq!(report.confidence, 0.7);
        assert!(report.frameworks.is_empty());
    }

    #[tokio::test]
    async fn test_manifest_extraction_at_standard_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.apk");
        let manifest = utf16_bytes(&[
            "com.example.demo",
            "com.example.demo",
            "android.permission.INTERNET",
        ]);
        write_fixture_apk(&path, &["classes.dex"], Some(&manifest));

        let file = ApkFile::from_path(&path).unwrap();
        let analyzer = ArchiveAnalyzer::new(AnalyzeOptions::default());
        let report = analyzer.analyze(&file).await.unwrap();

        assert_eq!(report.package_name.as_deref(), Some("com.example.demo"));
        assert_eq!(report.permissions, vec!["android.permission.INTERNET"]);
    }

    #[tokio::test]
    async fn test_quick_depth_skips_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.apk");
        let manifest = utf16_bytes(&["android.permission.CAMERA"]);
        write_fixture_apk(&path, &["classes.dex"], Some(&manifest));

        let file = ApkFile::from_path(&path).unwrap();
        let options = AnalyzeOptions::default().with_depth(AnalysisDepth::Quick);
        let report = ArchiveAnalyzer::new(options).analyze(&file).await.unwrap();

        assert!(report.permissions.is_empty());
        assert!(report.package_name.is_none());
    }

    #[tokio::test]
    async fn test_deep_depth_digest_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.apk");
        write_fixture_apk(&path, &["classes.dex"], None);

        let file = ApkFile::from_path(&path).unwrap();
        let options = AnalyzeOptions::default().with_depth(AnalysisDepth::Deep);
        let report = ArchiveAnalyzer::new(options).analyze(&file).await.unwrap();

        let digest = report.digest.unwrap();
        assert_eq!(digest.len(), 64); // BLAKE3 hex
        assert!(report.archive_stats.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_typed_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.apk");
        std::fs::write(&path, b"this is not a zip file").unwrap();

        let file = ApkFile::from_path(&path).unwrap();
        let analyzer = ArchiveAnalyzer::new(AnalyzeOptions::default());
        let result = analyzer.analyze(&file).await;

        assert!(matches!(result, Err(AnalyzeError::BadArchive { .. })));
    }

    #[tokio::test]
    async fn test_missing_file_is_open_error() {
        let file = ApkFile {
            path: Path::new("/nonexistent/ghost.apk").to_path_buf(),
            file_name: "ghost.apk".to_string(),
            size_bytes: 0,
            modified: None,
        };
        let analyzer = ArchiveAnalyzer::new(AnalyzeOptions::default());
        let result = analyzer.analyze(&file).await;

        assert!(matches!(result, Err(AnalyzeError::OpenFailed { .. })));
    }
}
