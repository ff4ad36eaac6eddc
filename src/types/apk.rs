//! Input specification and package file records.
//!
//! Provides flexible input parsing supporting:
//! - Single package files (.apk, .xapk, .apks)
//! - Directory trees, walked recursively
//! - Multiple inputs per invocation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;
use walkdir::WalkDir;

/// Archive extensions treated as installable packages during directory walks.
const PACKAGE_EXTENSIONS: [&str; 3] = ["apk", "xapk", "apks"];

/// A package file that has been located on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApkFile {
    /// Full path to the archive.
    pub path: PathBuf,
    /// File name component, used for display and ordering.
    pub file_name: String,
    /// Archive size in bytes.
    pub size_bytes: u64,
    /// Last modification time, if the filesystem reports one.
    pub modified: Option<DateTime<Utc>>,
}

impl ApkFile {
    /// Build a record from a path, reading filesystem metadata.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = path.metadata()?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size_bytes: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Whether the file name carries a split-bundle extension.
    pub fn is_bundle(&self) -> bool {
        let lower = self.file_name.to_lowercase();
        lower.ends_with(".xapk") || lower.ends_with(".apks")
    }
}

impl fmt::Display for ApkFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Error type for input parsing and expansion.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("path not found: {0}")]
    NotFound(String),
    #[error("not a file or directory: {0}")]
    NotFileOrDir(String),
    #[error("cannot read '{path}': {reason}")]
    Unreadable { path: String, reason: String },
    #[error("too many package files: more than {0} matched (raise --max-files to allow)")]
    TooManyFiles(usize),
}

/// A parsed input argument: either a single file or a directory to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSpec {
    /// A single archive file (any extension accepted when named explicitly).
    File(PathBuf),
    /// A directory tree to walk for package files.
    Dir(PathBuf),
}

impl InputSpec {
    /// Default recursion limit for directory walks.
    pub const DEFAULT_MAX_DEPTH: usize = 16;

    /// Classify an argument as file or directory.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let path = Path::new(s.trim());

        if !path.exists() {
            return Err(TargetError::NotFound(s.to_string()));
        }
        if path.is_file() {
            return Ok(Self::File(path.to_path_buf()));
        }
        if path.is_dir() {
            return Ok(Self::Dir(path.to_path_buf()));
        }

        Err(TargetError::NotFileOrDir(s.to_string()))
    }

    /// Resolve this input to a list of package files.
    ///
    /// A file yields itself. A directory is walked recursively, collecting
    /// entries with a package extension (case-insensitive). Results are
    /// sorted by lowercased file name so enumeration order is deterministic.
    /// More than `max_files` matches is an error.
    pub fn expand(&self, max_files: usize, max_depth: usize) -> Result<Vec<ApkFile>, TargetError> {
        let mut files = match self {
            Self::File(path) => {
                let file =
                    ApkFile::from_path(path).map_err(|e| TargetError::Unreadable {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                vec![file]
            }

            Self::Dir(root) => {
                let mut found = Vec::new();

                // Symlinks are not followed, so cycles cannot occur.
                for entry in WalkDir::new(root).max_depth(max_depth) {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(e) => {
                            warn!("skipping unreadable entry under {}: {}", root.display(), e);
                            continue;
                        }
                    };

                    if !entry.file_type().is_file() || !has_package_extension(entry.path()) {
                        continue;
                    }

                    match ApkFile::from_path(entry.path()) {
                        Ok(file) => found.push(file),
                        Err(e) => {
                            warn!("skipping {}: {}", entry.path().display(), e);
                            continue;
                        }
                    }

                    if found.len() > max_files {
                        return Err(TargetError::TooManyFiles(max_files));
                    }
                }

                found
            }
        };

        files.sort_by_key(|f| f.file_name.to_lowercase());
        Ok(files)
    }
}

impl FromStr for InputSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for InputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Dir(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Check whether a path carries a recognized package extension.
fn has_package_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map_or(false, |ext| PACKAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_missing_path() {
        let result = InputSpec::parse("/definitely/not/a/real/path.apk");
        assert!(matches!(result, Err(TargetError::NotFound(_))));
    }

    #[test]
    fn test_parse_file_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let apk = dir.path().join("app.apk");
        fs::write(&apk, b"stub").unwrap();

        let spec = InputSpec::parse(apk.to_str().unwrap()).unwrap();
        assert!(matches!(spec, InputSpec::File(_)));

        let spec = InputSpec::parse(dir.path().to_str().unwrap()).unwrap();
        assert!(matches!(spec, InputSpec::Dir(_)));
    }

    #[test]
    fn test_package_extension_case_insensitive() {
        assert!(has_package_extension(Path::new("a/b/App.APK")));
        assert!(has_package_extension(Path::new("bundle.XApk")));
        assert!(has_package_extension(Path::new("splits.apks")));
        assert!(!has_package_extension(Path::new("archive.zip")));
        assert!(!has_package_extension(Path::new("noext")));
    }

    #[test]
    fn test_expand_sorts_by_lowercased_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Zebra.apk", "alpha.apk", "Mango.apk"] {
            fs::write(dir.path().join(name), b"stub").unwrap();
        }

        let spec = InputSpec::Dir(dir.path().to_path_buf());
        let files = spec.expand(100, InputSpec::DEFAULT_MAX_DEPTH).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["alpha.apk", "Mango.apk", "Zebra.apk"]);
    }

    #[test]
    fn test_expand_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let spec = InputSpec::Dir(dir.path().to_path_buf());
        let files = spec.expand(100, InputSpec::DEFAULT_MAX_DEPTH).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_expand_too_many_files() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            fs::write(dir.path().join(format!("app{}.apk", i)), b"stub").unwrap();
        }

        let spec = InputSpec::Dir(dir.path().to_path_buf());
        let result = spec.expand(3, InputSpec::DEFAULT_MAX_DEPTH);
        assert!(matches!(result, Err(TargetError::TooManyFiles(3))));
    }

    #[test]
    fn test_explicit_file_any_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.zip");
        fs::write(&path, b"stub").unwrap();

        let spec = InputSpec::File(path);
        let files = spec.expand(100, InputSpec::DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "package.zip");
    }

    #[test]
    fn test_bundle_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Game.XAPK");
        fs::write(&path, b"stub").unwrap();

        let file = ApkFile::from_path(&path).unwrap();
        assert!(file.is_bundle());
    }
}
