//! # apklens - Android Package Framework Classifier
//!
//! apklens inspects Android package archives and classifies each by the
//! cross-platform framework it was built with, using nothing but the entry
//! names inside the archive.
//!
//! ## Features
//!
//! - **Framework Detection**: Flutter, React Native, Xamarin, Cordova, Ionic,
//!   Unity, Kotlin Multiplatform, and native Android
//! - **Library Inference**: Framework package tables, `META-INF` markers, and
//!   native `.so` names map entries to known third-party libraries
//! - **Split Bundles**: `.xapk` and `.apks` bundles are merged across members
//! - **Batch Analysis**: Async directory scans with bounded concurrency
//! - **Scan Profiles**: Save and reuse analysis configurations
//! - **Result Persistence**: Runs are saved and can be exported later
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use apklens::engine::{analyzer_for, AnalyzeOptions};
//! use apklens::types::ApkFile;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let path = Path::new("app.apk");
//!     let file = ApkFile::from_path(path).unwrap();
//!     let analyzer = analyzer_for(path, AnalyzeOptions::default());
//!
//!     let report = analyzer.analyze(&file).await.unwrap();
//!     println!("{} is {} ({:.0}%)", report.file, report.kind, report.confidence * 100.0);
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`types`] - Core type definitions with newtype patterns for type safety
//! - [`detect`] - Framework signature tables and the evidence accumulator
//! - [`engine`] - Archive analyzers and the concurrent batch driver
//! - [`manifest`] - String recovery from binary `AndroidManifest.xml`
//! - [`config`] - Configuration management and scan profiles
//! - [`storage`] - Run persistence
//! - [`error`] - Comprehensive error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod output;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use detect::{Evidence, FrameworkHit, LibraryHit};
pub use engine::{AnalysisDepth, AnalyzeOptions, ApkReport, PackageAnalyzer};
pub use error::{AnalyzeError, CliError};
pub use types::{ApkFile, AppKind, InputSpec, ReportId};
