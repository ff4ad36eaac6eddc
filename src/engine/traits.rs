//! Analyzer trait abstraction.
//!
//! Defines a common interface for package analyzers, enabling polymorphism
//! over single archives and split bundles, and easier testing.

use crate::detect::{Evidence, FrameworkHit, LibraryHit};
use crate::error::AnalyzeResult;
use crate::types::{ApkFile, AppKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

/// How deep an analysis looks into the archive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    /// Entry names only.
    Quick,
    /// Quick, plus manifest string extraction (package name, permissions).
    Standard,
    /// Standard, plus a content digest and entry size totals.
    Deep,
}

impl Default for AnalysisDepth {
    fn default() -> Self {
        Self::Standard
    }
}

impl fmt::Display for AnalysisDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quick => write!(f, "quick"),
            Self::Standard => write!(f, "standard"),
            Self::Deep => write!(f, "deep"),
        }
    }
}

impl std::str::FromStr for AnalysisDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            _ => Err(format!("unknown analysis depth: {}", s)),
        }
    }
}

/// The archive shapes an analyzer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// A single `.apk` archive.
    Apk,
    /// A `.xapk`/`.apks` split bundle of inner APKs.
    Bundle,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apk => write!(f, "apk"),
            Self::Bundle => write!(f, "bundle"),
        }
    }
}

/// Options controlling one analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Analysis depth.
    pub depth: AnalysisDepth,
    /// Run the library inference tables over entry names.
    pub infer_libraries: bool,
    /// Read the manifest for permissions and package name (Standard+).
    pub read_permissions: bool,
    /// Largest bundle member read into memory, in bytes.
    pub member_size_cap: u64,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            depth: AnalysisDepth::default(),
            infer_libraries: true,
            read_permissions: true,
            member_size_cap: Self::DEFAULT_MEMBER_CAP,
        }
    }
}

impl AnalyzeOptions {
    /// Default bundle member size cap (512 MiB).
    pub const DEFAULT_MEMBER_CAP: u64 = 512 * 1024 * 1024;

    /// Set the analysis depth.
    pub fn with_depth(mut self, depth: AnalysisDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Disable library inference.
    pub fn without_libraries(mut self) -> Self {
        self.infer_libraries = false;
        self
    }

    /// Disable manifest permission extraction.
    pub fn without_permissions(mut self) -> Self {
        self.read_permissions = false;
        self
    }
}

/// Entry size totals collected at Deep depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveStats {
    /// Sum of compressed entry sizes.
    pub compressed_bytes: u64,
    /// Sum of uncompressed entry sizes.
    pub uncompressed_bytes: u64,
}

/// The analysis result for one package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApkReport {
    /// File name of the analyzed archive.
    pub file: String,
    /// Full path of the analyzed archive.
    pub path: PathBuf,
    /// Archive size in bytes.
    pub size_bytes: u64,
    /// Package name recovered from the manifest, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    /// Framework label, chosen by precedence.
    pub kind: AppKind,
    /// Evidence-graded confidence in `kind`, 0.0 to 0.9.
    pub confidence: f32,
    /// All frameworks with matched markers (hybrids list several).
    pub frameworks: Vec<FrameworkHit>,
    /// Third-party libraries inferred from entry names.
    pub libraries: Vec<LibraryHit>,
    /// Native shared library file names.
    pub native_libraries: Vec<String>,
    /// ABIs shipping native code.
    pub abis: Vec<String>,
    /// Permission identifiers recovered from the manifest.
    pub permissions: Vec<String>,
    /// Number of archive entries scanned.
    pub entries_scanned: usize,
    /// Whether Dalvik bytecode is present.
    pub has_dex: bool,
    /// BLAKE3 digest of the archive, Deep depth only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Entry size totals, Deep depth only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_stats: Option<ArchiveStats>,
    /// Wall-clock analysis time in milliseconds.
    pub duration_ms: u64,
}

impl ApkReport {
    /// Assemble a report from accumulated evidence.
    pub fn from_evidence(file: &ApkFile, evidence: &Evidence) -> Self {
        let kind = evidence.classify();
        Self {
            file: file.file_name.clone(),
            path: file.path.clone(),
            size_bytes: file.size_bytes,
            package_name: None,
            kind,
            confidence: evidence.confidence(kind),
            frameworks: evidence.framework_hits(),
            libraries: evidence.library_hits(),
            native_libraries: evidence.native_libraries.iter().cloned().collect(),
            abis: evidence.abis.iter().cloned().collect(),
            permissions: Vec::new(),
            entries_scanned: evidence.entries_scanned,
            has_dex: evidence.has_dex,
            digest: None,
            archive_stats: None,
            duration_ms: 0,
        }
    }

    /// One-line summary used by logs and history listings.
    pub fn summary(&self) -> String {
        format!(
            "{} - {} ({:.0}% confidence, {} entries)",
            self.file,
            self.kind,
            self.confidence * 100.0,
            self.entries_scanned
        )
    }
}

/// Trait for package analyzer implementations.
///
/// Abstracts over archive shapes, allowing single APKs and split bundles to
/// be analyzed interchangeably.
#[async_trait]
pub trait PackageAnalyzer: Send + Sync {
    /// The archive shape this analyzer handles.
    fn package_kind(&self) -> PackageKind;

    /// The configured analysis depth.
    fn depth(&self) -> AnalysisDepth;

    /// Analyze one package file.
    async fn analyze(&self, file: &ApkFile) -> AnalyzeResult<ApkReport>;
}

/// A boxed analyzer for dynamic dispatch.
pub type BoxedAnalyzer = Box<dyn PackageAnalyzer>;

/// Pick the analyzer for a path, keyed on file extension.
pub fn analyzer_for(path: &Path, options: AnalyzeOptions) -> BoxedAnalyzer {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xapk" | "apks" => Box::new(super::bundle::BundleAnalyzer::new(options)),
        _ => Box::new(super::archive::ArchiveAnalyzer::new(options)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_ordering() {
        assert!(AnalysisDepth::Quick < AnalysisDepth::Standard);
        assert!(AnalysisDepth::Standard < AnalysisDepth::Deep);
    }

    #[test]
    fn test_depth_from_str() {
        assert_eq!("quick".parse::<AnalysisDepth>().unwrap(), AnalysisDepth::Quick);
        assert_eq!("DEEP".parse::<AnalysisDepth>().unwrap(), AnalysisDepth::Deep);
        assert!("thorough".parse::<AnalysisDepth>().is_err());
    }

    #[test]
    fn test_analyzer_factory_by_extension() {
        let options = AnalyzeOptions::default();
        let a = analyzer_for(Path::new("app.apk"), options.clone());
        assert_eq!(a.package_kind(), PackageKind::Apk);

        let a = analyzer_for(Path::new("Game.XAPK"), options.clone());
        assert_eq!(a.package_kind(), PackageKind::Bundle);

        let a = analyzer_for(Path::new("splits.apks"), options.clone());
        assert_eq!(a.package_kind(), PackageKind::Bundle);

        // Unknown extensions are treated as plain archives.
        let a = analyzer_for(Path::new("payload.zip"), options);
        assert_eq!(a.package_kind(), PackageKind::Apk);
    }

    #[test]
    fn test_options_builders() {
        let options = AnalyzeOptions::default()
            .with_depth(AnalysisDepth::Deep)
            .without_libraries()
            .without_permissions();
        assert_eq!(options.depth, AnalysisDepth::Deep);
        assert!(!options.infer_libraries);
        assert!(!options.read_permissions);
    }

    #[test]
    fn test_report_serialization_skips_empty_optionals() {
        let file = ApkFile {
            path: PathBuf::from("/tmp/a.apk"),
            file_name: "a.apk".to_string(),
            size_bytes: 10,
            modified: None,
        };
        let report = ApkReport::from_evidence(&file, &Evidence::default());
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("digest"));
        assert!(!json.contains("package_name"));
        assert!(!json.contains("archive_stats"));
    }
}
