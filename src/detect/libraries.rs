//! Cross-framework library lookup tables.
//!
//! These tables apply to every package regardless of the framework label:
//! `META-INF/` version markers and native `.so` names left by common
//! Android libraries, and Kotlin Multiplatform runtime paths that can
//! appear in any app.

use super::LibraryHit;
use std::sync::LazyLock;

/// Needles found in `META-INF/` entry names, mapped to library names.
/// Gradle emits `<group>_<artifact>.version` files there, which makes this
/// the most reliable name-only signal available.
const META_INF_LIBRARIES: [(&str, &str); 14] = [
    ("androidx.lifecycle", "androidx.lifecycle"),
    ("androidx.navigation", "androidx.navigation"),
    ("androidx.room", "androidx.room"),
    ("androidx.work", "androidx.work"),
    ("androidx.compose", "androidx.compose"),
    ("androidx.camera", "androidx.camera"),
    ("androidx.biometric", "androidx.biometric"),
    ("retrofit", "retrofit2"),
    ("okhttp", "okhttp3"),
    ("gson", "gson"),
    ("glide", "glide"),
    ("picasso", "picasso"),
    ("dagger", "dagger"),
    ("rxjava", "rxjava"),
];

/// Substrings of lowercased native library file names, mapped to library
/// names. Less precise than `META-INF/` but survives resource stripping.
const SO_NAME_LIBRARIES: [(&str, &str); 5] = [
    ("okhttp", "okhttp3"),
    ("retrofit", "retrofit2"),
    ("glide", "glide"),
    ("picasso", "picasso"),
    ("gson", "gson"),
];

/// KMP runtime libraries. Dotted coordinates are matched with the dots
/// mapped to path separators (`kotlinx.coroutines` -> `kotlinx/coroutines`).
const KMP_LIBRARIES: [&str; 8] = [
    "kotlinx.coroutines",
    "kotlinx.serialization",
    "ktor",
    "sqldelight",
    "koin",
    "kodein",
    "multiplatform-settings",
    "kermit",
];

static KMP_PATH_PATTERNS: LazyLock<Vec<(String, &'static str)>> = LazyLock::new(|| {
    KMP_LIBRARIES
        .iter()
        .map(|lib| (lib.replace('.', "/"), *lib))
        .collect()
});

/// Apply every cross-framework table to one entry name.
pub fn cross_hits(entry: &str) -> Vec<LibraryHit> {
    let mut hits = Vec::new();

    if entry.starts_with("META-INF/") {
        for (needle, name) in &META_INF_LIBRARIES {
            if entry.contains(needle) {
                hits.push(LibraryHit::new(*name, entry));
            }
        }
    }

    if let Some((_, so_name)) = native_library(entry) {
        let lower = so_name.to_lowercase();
        for (needle, name) in &SO_NAME_LIBRARIES {
            if lower.contains(needle) {
                hits.push(LibraryHit::new(*name, entry));
            }
        }
    }

    for (pattern, name) in KMP_PATH_PATTERNS.iter() {
        if entry.contains(pattern.as_str()) {
            hits.push(LibraryHit::new(*name, entry));
        }
    }

    hits
}

/// Parse a native library entry: `lib/<abi>/<name>.so` yields
/// `(abi, name)`. Nested paths under the ABI directory keep only the file
/// name.
pub fn native_library(entry: &str) -> Option<(String, String)> {
    let rest = entry.strip_prefix("lib/")?;
    let (abi, tail) = rest.split_once('/')?;
    let name = tail.rsplit('/').next()?;
    if abi.is_empty() || !name.ends_with(".so") {
        return None;
    }
    Some((abi.to_string(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_inf_hits() {
        let hits = cross_hits("META-INF/androidx.room_room-runtime.version");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "androidx.room");

        let hits = cross_hits("META-INF/com.squareup.retrofit2_retrofit.version");
        assert_eq!(hits[0].name, "retrofit2");
    }

    #[test]
    fn test_meta_inf_prefix_required() {
        assert!(cross_hits("res/androidx.room/whatever").is_empty());
    }

    #[test]
    fn test_so_name_hits() {
        let hits = cross_hits("lib/arm64-v8a/libokhttp_native.so");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "okhttp3");
    }

    #[test]
    fn test_kmp_dotted_coordinates() {
        let hits = cross_hits("kotlinx/coroutines/internal/MainDispatcher.class");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "kotlinx.coroutines");

        let hits = cross_hits("assets/ktor/client.properties");
        assert_eq!(hits[0].name, "ktor");
    }

    #[test]
    fn test_native_library_parse() {
        assert_eq!(
            native_library("lib/arm64-v8a/libfoo.so"),
            Some(("arm64-v8a".to_string(), "libfoo.so".to_string()))
        );
        assert_eq!(native_library("lib/libfoo.so"), None);
        assert_eq!(native_library("lib/arm64-v8a/readme.txt"), None);
        assert_eq!(native_library("assets/lib/arm64-v8a/libfoo.so"), None);
    }
}
