//! Framework signature matching.
//!
//! This module is the core of the classification engine: a fixed table of
//! path/filename patterns per framework, applied by substring match to every
//! entry name in a package archive. Detectors are stateless and tables are
//! `'static`, so matching never allocates on the hit path.
//!
//! Entry names are matched case-sensitively; APK entry names are
//! byte-exact paths and the marker tables are written in the casing the
//! build tools produce.

mod frameworks;
pub mod libraries;

pub use frameworks::detectors;

use crate::types::AppKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One framework detected in an archive, with the markers that matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkHit {
    /// The framework this evidence points at.
    pub kind: AppKind,
    /// Distinct marker patterns that matched entry names.
    pub markers: Vec<String>,
}

/// A third-party library inferred from an archive entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryHit {
    /// Library name as reported to the user.
    pub name: String,
    /// The entry name (or pattern) that produced this inference.
    pub evidence: String,
}

impl LibraryHit {
    pub fn new(name: impl Into<String>, evidence: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            evidence: evidence.into(),
        }
    }
}

/// Detects one framework by its marker table.
///
/// One implementation per framework; see [`frameworks`]. Implementations are
/// unit structs carrying their tables as consts, registered in
/// [`detectors()`].
pub trait FrameworkDetector: Send + Sync {
    /// The framework label this detector produces.
    fn kind(&self) -> AppKind;

    /// Marker patterns whose presence in an entry name indicates this
    /// framework.
    fn markers(&self) -> &'static [&'static str];

    /// Check a single entry name, returning the matched marker if any.
    fn examine(&self, entry: &str) -> Option<&'static str> {
        self.markers().iter().copied().find(|m| entry.contains(m))
    }

    /// Framework-specific library inference for a single entry name.
    ///
    /// Default: no inference. Overridden by frameworks whose packages embed
    /// recognizable library paths (Flutter asset packages, Xamarin
    /// assemblies, Cordova plugins, Unity managed assemblies, React Native
    /// bundles).
    fn library_hit(&self, _entry: &str) -> Option<LibraryHit> {
        None
    }
}

/// Accumulated evidence from scanning archive entry names.
///
/// Ordered collections keep reports deterministic regardless of entry order
/// inside the archive. A marker or library is recorded at most once.
#[derive(Debug, Default, Clone)]
pub struct Evidence {
    /// Matched markers, grouped by framework.
    pub marker_hits: BTreeMap<AppKind, BTreeSet<&'static str>>,
    /// Inferred libraries: name -> first entry that produced the inference.
    pub libraries: BTreeMap<String, String>,
    /// Native shared library file names under `lib/<abi>/`.
    pub native_libraries: BTreeSet<String>,
    /// ABIs with at least one native library.
    pub abis: BTreeSet<String>,
    /// Whether any `classes*.dex` entry is present.
    pub has_dex: bool,
    /// Number of entry names fed to `observe`.
    pub entries_scanned: usize,
}

impl Evidence {
    /// Feed one entry name through every detector and lookup table.
    pub fn observe(&mut self, entry: &str, infer_libraries: bool) {
        self.entries_scanned += 1;

        if is_dex_entry(entry) {
            self.has_dex = true;
        }

        if let Some((abi, name)) = libraries::native_library(entry) {
            self.abis.insert(abi);
            self.native_libraries.insert(name);
        }

        for detector in detectors() {
            if let Some(marker) = detector.examine(entry) {
                self.marker_hits
                    .entry(detector.kind())
                    .or_default()
                    .insert(marker);
            }

            if infer_libraries {
                if let Some(hit) = detector.library_hit(entry) {
                    self.add_library(hit);
                }
            }
        }

        if infer_libraries {
            for hit in libraries::cross_hits(entry) {
                self.add_library(hit);
            }
        }
    }

    /// Record a library hit, keeping the first evidence seen for a name.
    pub fn add_library(&mut self, hit: LibraryHit) {
        self.libraries.entry(hit.name).or_insert(hit.evidence);
    }

    /// Merge evidence from another archive (split-bundle members).
    pub fn merge(&mut self, other: Evidence) {
        for (kind, markers) in other.marker_hits {
            self.marker_hits.entry(kind).or_default().extend(markers);
        }
        for (name, evidence) in other.libraries {
            self.libraries.entry(name).or_insert(evidence);
        }
        self.native_libraries.extend(other.native_libraries);
        self.abis.extend(other.abis);
        self.has_dex |= other.has_dex;
        self.entries_scanned += other.entries_scanned;
    }

    /// Pick the framework label by precedence over the matched markers.
    ///
    /// Archives with no framework markers classify as native; hybrid
    /// packages report all hits in [`Self::framework_hits`] but the label is
    /// the precedence winner.
    pub fn classify(&self) -> AppKind {
        for kind in AppKind::PRECEDENCE {
            if kind == AppKind::Native {
                break;
            }
            if self.marker_hits.contains_key(&kind) {
                return kind;
            }
        }
        AppKind::Native
    }

    /// Grade the classification on evidence count.
    ///
    /// A framework label backed by two or more distinct markers scores 0.9,
    /// a single marker 0.75. Native with bytecode present scores 0.7,
    /// native with only library evidence 0.5, and a bare archive 0.2.
    /// `Unknown` (uninspectable archive) scores 0.0.
    pub fn confidence(&self, kind: AppKind) -> f32 {
        match kind {
            AppKind::Unknown => 0.0,
            AppKind::Native => {
                if self.has_dex {
                    0.7
                } else if !self.libraries.is_empty() {
                    0.5
                } else {
                    0.2
                }
            }
            framework => {
                let markers = self
                    .marker_hits
                    .get(&framework)
                    .map_or(0, |set| set.len());
                if markers >= 2 {
                    0.9
                } else {
                    0.75
                }
            }
        }
    }

    /// All framework hits, one entry per framework with its markers.
    pub fn framework_hits(&self) -> Vec<FrameworkHit> {
        self.marker_hits
            .iter()
            .map(|(kind, markers)| FrameworkHit {
                kind: *kind,
                markers: markers.iter().map(|m| m.to_string()).collect(),
            })
            .collect()
    }

    /// All inferred libraries, sorted by name.
    pub fn library_hits(&self) -> Vec<LibraryHit> {
        self.libraries
            .iter()
            .map(|(name, evidence)| LibraryHit::new(name.clone(), evidence.clone()))
            .collect()
    }
}

/// Whether an entry name is Dalvik bytecode (`classes.dex`,
/// `classes2.dex`, ...).
fn is_dex_entry(entry: &str) -> bool {
    entry.starts_with("classes") && entry.ends_with(".dex") && !entry.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_all(entries: &[&str]) -> Evidence {
        let mut evidence = Evidence::default();
        for entry in entries {
            evidence.observe(entry, true);
        }
        evidence
    }

    #[test]
    fn test_flutter_markers() {
        let evidence = observe_all(&[
            "assets/flutter_assets/AssetManifest.json",
            "lib/arm64-v8a/libflutter.so",
            "classes.dex",
        ]);
        assert_eq!(evidence.classify(), AppKind::Flutter);
        // Two distinct markers: flutter_assets and libflutter.so.
        assert_eq!(evidence.confidence(AppKind::Flutter), 0.9);
    }

    #[test]
    fn test_single_marker_confidence() {
        let evidence = observe_all(&["lib/arm64-v8a/libhermes.so"]);
        assert_eq!(evidence.classify(), AppKind::ReactNative);
        assert_eq!(evidence.confidence(AppKind::ReactNative), 0.75);
    }

    #[test]
    fn test_native_with_dex() {
        let evidence = observe_all(&["classes.dex", "resources.arsc", "res/layout/main.xml"]);
        assert_eq!(evidence.classify(), AppKind::Native);
        assert_eq!(evidence.confidence(AppKind::Native), 0.7);
    }

    #[test]
    fn test_bare_archive() {
        let evidence = Evidence::default();
        assert_eq!(evidence.classify(), AppKind::Native);
        assert_eq!(evidence.confidence(AppKind::Native), 0.2);
    }

    #[test]
    fn test_unknown_confidence_is_zero() {
        let evidence = Evidence::default();
        assert_eq!(evidence.confidence(AppKind::Unknown), 0.0);
    }

    #[test]
    fn test_precedence_flutter_beats_react_native() {
        let evidence = observe_all(&[
            "lib/arm64-v8a/libhermes.so",
            "assets/flutter_assets/kernel_blob.bin",
        ]);
        assert_eq!(evidence.classify(), AppKind::Flutter);
        // Hybrid still reports both frameworks.
        let kinds: Vec<AppKind> = evidence.framework_hits().iter().map(|h| h.kind).collect();
        assert!(kinds.contains(&AppKind::Flutter));
        assert!(kinds.contains(&AppKind::ReactNative));
    }

    #[test]
    fn test_ionic_beats_cordova() {
        let evidence = observe_all(&[
            "assets/capacitor.config.json",
            "assets/www/index.html",
        ]);
        assert_eq!(evidence.classify(), AppKind::Ionic);
    }

    #[test]
    fn test_native_library_collection() {
        let evidence = observe_all(&[
            "lib/arm64-v8a/libfoo.so",
            "lib/armeabi-v7a/libfoo.so",
            "lib/arm64-v8a/libbar.so",
        ]);
        assert_eq!(evidence.native_libraries.len(), 2);
        assert_eq!(evidence.abis.len(), 2);
        assert!(evidence.abis.contains("arm64-v8a"));
    }

    #[test]
    fn test_markers_recorded_once() {
        let evidence = observe_all(&[
            "assets/flutter_assets/a.png",
            "assets/flutter_assets/b.png",
        ]);
        let markers = &evidence.marker_hits[&AppKind::Flutter];
        assert_eq!(markers.len(), 1);
    }

    #[test]
    fn test_dex_entry_detection() {
        assert!(is_dex_entry("classes.dex"));
        assert!(is_dex_entry("classes2.dex"));
        assert!(!is_dex_entry("assets/classes.dex"));
        assert!(!is_dex_entry("classes.dex.prof"));
    }

    #[test]
    fn test_merge_combines_evidence() {
        let base = observe_all(&["classes.dex", "lib/arm64-v8a/libbase.so"]);
        let split = observe_all(&["lib/x86_64/libflutter.so"]);

        let mut merged = base;
        merged.merge(split);

        assert_eq!(merged.classify(), AppKind::Flutter);
        assert!(merged.has_dex);
        assert_eq!(merged.entries_scanned, 3);
        assert_eq!(merged.abis.len(), 2);
    }

    #[test]
    fn test_no_library_inference_when_disabled() {
        let mut evidence = Evidence::default();
        evidence.observe("META-INF/androidx.room_room-runtime.version", false);
        assert!(evidence.libraries.is_empty());
    }
}
