//! Split-bundle analyzer for `.xapk` and `.apks` archives.
//!
//! These formats are an outer zip of inner APKs (a base split plus config
//! splits). Each inner APK is analyzed in memory and the evidence is merged
//! before classification, so a framework shipped in a config split still
//! labels the package.

use crate::detect::Evidence;
use crate::engine::traits::{
    AnalysisDepth, AnalyzeOptions, ApkReport, ArchiveStats, PackageAnalyzer, PackageKind,
};
use crate::error::{AnalyzeError, AnalyzeResult};
use crate::manifest;
use crate::types::ApkFile;
use async_trait::async_trait;
use std::fs::File;
use std::io::{Cursor, Read};
use std::time::Instant;
use tracing::{debug, warn};
use zip::ZipArchive;

/// Analyzer for `.xapk`/`.apks` split bundles.
pub struct BundleAnalyzer {
    options: AnalyzeOptions,
}

impl BundleAnalyzer {
    pub fn new(options: AnalyzeOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl PackageAnalyzer for BundleAnalyzer {
    fn package_kind(&self) -> PackageKind {
        PackageKind::Bundle
    }

    fn depth(&self) -> AnalysisDepth {
        self.options.depth
    }

    async fn analyze(&self, file: &ApkFile) -> AnalyzeResult<ApkReport> {
        let options = self.options.clone();
        let path = file.path.clone();
        let file = file.clone();

        tokio::task::spawn_blocking(move || scan_bundle(&file, &options))
            .await
            .map_err(|e| AnalyzeError::OpenFailed {
                path,
                reason: format!("analysis task failed: {}", e),
            })?
    }
}

/// Synchronous scan of one bundle.
fn scan_bundle(file: &ApkFile, options: &AnalyzeOptions) -> AnalyzeResult<ApkReport> {
    let start = Instant::now();

    let handle = File::open(&file.path).map_err(|e| AnalyzeError::OpenFailed {
        path: file.path.clone(),
        reason: e.to_string(),
    })?;
    let mut outer = ZipArchive::new(handle).map_err(|e| AnalyzeError::BadArchive {
        path: file.path.clone(),
        reason: e.to_string(),
    })?;

    // file_names() has no stable order; sort so scans are deterministic.
    let mut member_names: Vec<String> = outer
        .file_names()
        .filter(|name| name.to_lowercase().ends_with(".apk"))
        .map(String::from)
        .collect();
    member_names.sort();

    if member_names.is_empty() {
        return Err(AnalyzeError::EmptyBundle);
    }

    let mut evidence = Evidence::default();
    let mut manifest_bytes: Option<Vec<u8>> = None;
    let mut members_scanned = 0usize;
    let mut stats = ArchiveStats {
        compressed_bytes: 0,
        uncompressed_bytes: 0,
    };

    for member_name in &member_names {
        let mut member =
            outer
                .by_name(member_name)
                .map_err(|e| AnalyzeError::EntryReadFailed {
                    entry: member_name.clone(),
                    reason: e.to_string(),
                })?;

        if member.size() > options.member_size_cap {
            warn!(
                member = %member_name,
                size = member.size(),
                cap = options.member_size_cap,
                "bundle member over size cap, skipping"
            );
            continue;
        }

        let mut bytes = Vec::with_capacity(member.size() as usize);
        member
            .read_to_end(&mut bytes)
            .map_err(|e| AnalyzeError::EntryReadFailed {
                entry: member_name.clone(),
                reason: e.to_string(),
            })?;
        drop(member);

        let mut inner = match ZipArchive::new(Cursor::new(bytes)) {
            Ok(inner) => inner,
            Err(e) => {
                warn!(member = %member_name, "bundle member is not a zip: {}", e);
                continue;
            }
        };

        let names: Vec<String> = inner.file_names().map(String::from).collect();
        let mut member_evidence = Evidence::default();
        for name in &names {
            member_evidence.observe(name, options.infer_libraries);
        }
        evidence.merge(member_evidence);
        members_scanned += 1;

        if options.depth == AnalysisDepth::Deep {
            let member_stats = super::archive::entry_stats(&mut inner);
            stats.compressed_bytes += member_stats.compressed_bytes;
            stats.uncompressed_bytes += member_stats.uncompressed_bytes;
        }

        // The base split carries the real manifest; keep the first one found,
        // preferring the member whose file name is exactly base.apk. A suffix
        // match would also hit names like not-the-base.apk.
        let is_base = member_name.rsplit('/').next() == Some("base.apk");
        let wants_manifest = options.depth >= AnalysisDepth::Standard
            && options.read_permissions
            && (manifest_bytes.is_none() || is_base);
        if wants_manifest {
            if let Ok(mut entry) = inner.by_name("AndroidManifest.xml") {
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                if entry.read_to_end(&mut bytes).is_ok() {
                    manifest_bytes = Some(bytes);
                }
            }
        }
    }

    if members_scanned == 0 {
        // Every member was skipped or unreadable.
        return Err(AnalyzeError::EmptyBundle);
    }

    let mut report = ApkReport::from_evidence(file, &evidence);

    if let Some(bytes) = manifest_bytes {
        report.permissions = manifest::extract_permissions(&bytes);
        report.package_name = manifest::guess_package_name(&bytes);
    }

    if options.depth == AnalysisDepth::Deep {
        report.digest = Some(super::archive::digest_file(&file.path)?);
        report.archive_stats = Some(stats);
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        file = %file.file_name,
        members = members_scanned,
        kind = %report.kind,
        duration_ms = report.duration_ms,
        "bundle scanned"
    );

    Ok(report)
}
