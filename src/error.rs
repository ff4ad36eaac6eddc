//! Error types for apklens.
//!
//! Uses `thiserror` for ergonomic error definitions. Each subsystem has its
//! own error enum and `Result` alias; `CliError` aggregates them at the
//! command layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while analyzing a single package archive.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("failed to open '{path}': {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("'{path}' is not a readable zip archive: {reason}")]
    BadArchive { path: PathBuf, reason: String },

    #[error("failed to read entry '{entry}': {reason}")]
    EntryReadFailed { entry: String, reason: String },

    #[error("bundle contains no apk members")]
    EmptyBundle,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for analysis operations.
pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Errors for configuration loading and paths.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory for config storage")]
    DirectoryNotFound,

    #[error("failed to read config file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write config file {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid config format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::InvalidFormat(e.to_string())
    }
}

/// Errors for profile management.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("profile '{0}' already exists")]
    AlreadyExists(String),

    #[error("profile '{0}' not found")]
    NotFound(String),

    #[error("failed to save profile: {0}")]
    SaveFailed(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for profile operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors for run storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage directory error: {0}")]
    DirectoryError(String),

    #[error("failed to save run: {0}")]
    SaveFailed(String),

    #[error("failed to load run: {0}")]
    LoadFailed(String),

    #[error("run '{0}' not found")]
    RunNotFound(String),

    #[error("ambiguous run prefix '{0}': {1} matches")]
    AmbiguousPrefix(String, usize),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SaveFailed(e.to_string())
    }
}

/// Top-level error for CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error(transparent)]
    Target(#[from] crate::types::TargetError),

    #[error(transparent)]
    ReportId(#[from] crate::types::ReportIdError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI command execution.
pub type CliResult<T> = Result<T, CliError>;
