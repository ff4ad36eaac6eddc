//! Scan subcommand implementation.
//!
//! Handles the `apklens scan <path>...` command for batch package analysis.

use crate::cli::OutputFormat;
use crate::config::{AppSettings, ProfileManager};
use crate::engine::{run_batch, AnalysisDepth, AnalyzeOptions, BatchConfig};
use crate::error::CliResult;
use crate::output;
use crate::storage::{ReportStore, RunRecord};
use crate::types::{ApkFile, InputSpec};
use clap::Parser;

/// Analyze package files under one or more paths.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Files or directories to scan
    ///
    /// Examples:
    ///   app.apk            Single package file
    ///   bundle.xapk        Split bundle
    ///   ~/Downloads        Directory tree (recursive)
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    /// Analysis depth (defaults to the configured depth)
    #[arg(short, long, value_enum)]
    pub depth: Option<AnalysisDepth>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Maximum number of packages analyzed concurrently
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Abort the whole scan when a directory expands to more files than this
    #[arg(long)]
    pub max_files: Option<usize>,

    /// Skip library inference
    #[arg(long = "no-libs")]
    pub no_libraries: bool,

    /// Skip permission extraction from the manifest
    #[arg(long = "no-permissions")]
    pub no_permissions: bool,

    /// Abort on the first package that fails to analyze
    #[arg(long)]
    pub fail_fast: bool,

    /// Don't save scan results
    #[arg(long)]
    pub no_save: bool,

    /// Use a saved scan profile
    #[arg(long = "profile", short = 'P')]
    pub profile: Option<String>,
}

impl ScanCommand {
    /// Resolve the analysis depth: explicit flag, then settings, then standard.
    fn resolve_depth(&self, settings: &AppSettings) -> AnalysisDepth {
        self.depth
            .or_else(|| settings.default_depth.parse().ok())
            .unwrap_or_default()
    }

    /// Resolve the output format: explicit flag, then settings, then plain.
    fn resolve_output(&self, settings: &AppSettings) -> OutputFormat {
        self.output
            .or_else(|| settings.default_output_format.parse().ok())
            .unwrap_or_default()
    }

    fn resolve_concurrency(&self, settings: &AppSettings) -> usize {
        self.concurrency.unwrap_or(settings.default_concurrency)
    }

    fn resolve_max_files(&self, settings: &AppSettings) -> usize {
        self.max_files.unwrap_or(settings.max_files)
    }

    /// Execute the scan command.
    pub async fn execute(
        &self,
        settings: &AppSettings,
        verbose: bool,
        quiet: bool,
    ) -> CliResult<()> {
        let format = self.resolve_output(settings);

        // Apply profile if specified
        let (depth, concurrency, infer_libraries, read_permissions, max_files, fail_fast) =
            if let Some(profile_name) = &self.profile {
                let manager = ProfileManager::new()?;
                let profile = manager.get(profile_name).ok_or_else(|| {
                    crate::error::CliError::Other(format!(
                        "profile '{}' not found",
                        profile_name
                    ))
                })?;

                (
                    profile.analysis_depth()?,
                    profile.concurrency,
                    profile.infer_libraries,
                    profile.read_permissions,
                    profile.max_files,
                    profile.fail_fast,
                )
            } else {
                (
                    self.resolve_depth(settings),
                    self.resolve_concurrency(settings),
                    !self.no_libraries,
                    !self.no_permissions,
                    self.resolve_max_files(settings),
                    self.fail_fast,
                )
            };

        // Expand each path and combine, re-sorting across paths
        let mut files: Vec<ApkFile> = Vec::new();
        for path in &self.paths {
            let spec = InputSpec::parse(path)?;
            files.extend(spec.expand(max_files, InputSpec::DEFAULT_MAX_DEPTH)?);
        }
        // Dedup on path first so overlapping input paths don't double-count
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        files.sort_by_key(|f| f.file_name.to_lowercase());

        if files.is_empty() {
            if !quiet {
                output::print_info("0 packages found, nothing to do.");
            }
            return Ok(());
        }

        let root = self.paths.join(", ");

        if !quiet && format == OutputFormat::Plain {
            output::print_scan_header(&root, &depth.to_string(), files.len());
        }

        let mut options = AnalyzeOptions::default().with_depth(depth);
        if !infer_libraries {
            options = options.without_libraries();
        }
        if !read_permissions {
            options = options.without_permissions();
        }

        let batch = BatchConfig {
            concurrency,
            fail_fast,
            progress: verbose && !quiet && format == OutputFormat::Plain,
        };

        let outcome = run_batch(files, options, batch).await?;

        let record = RunRecord::new(root, depth).finalize(outcome);

        // Save results unless disabled
        if !self.no_save && settings.auto_save_runs {
            let store = ReportStore::new()?;
            store.save(&record)?;
            if !quiet && format == OutputFormat::Plain {
                output::print_info(&format!("Run saved with ID: {}", record.id.short()));
            }
        }

        output::print_record(&record, format)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_settings() -> AppSettings {
        AppSettings {
            default_concurrency: 3,
            default_depth: "deep".to_string(),
            default_output_format: "json".to_string(),
            verbose: false,
            max_files: 500,
            auto_save_runs: true,
        }
    }

    #[test]
    fn test_settings_provide_scan_defaults() {
        let cmd = ScanCommand::parse_from(["scan", "a.apk"]);
        let settings = custom_settings();
        assert_eq!(cmd.resolve_depth(&settings), AnalysisDepth::Deep);
        assert_eq!(cmd.resolve_output(&settings), OutputFormat::Json);
        assert_eq!(cmd.resolve_concurrency(&settings), 3);
        assert_eq!(cmd.resolve_max_files(&settings), 500);
    }

    #[test]
    fn test_flags_override_settings() {
        let cmd = ScanCommand::parse_from([
            "scan", "a.apk", "--depth", "quick", "--output", "csv", "-c", "16", "--max-files",
            "42",
        ]);
        let settings = custom_settings();
        assert_eq!(cmd.resolve_depth(&settings), AnalysisDepth::Quick);
        assert_eq!(cmd.resolve_output(&settings), OutputFormat::Csv);
        assert_eq!(cmd.resolve_concurrency(&settings), 16);
        assert_eq!(cmd.resolve_max_files(&settings), 42);
    }

    #[test]
    fn test_unparseable_settings_fall_back_to_builtins() {
        let cmd = ScanCommand::parse_from(["scan", "a.apk"]);
        let settings = AppSettings {
            default_depth: "bogus".to_string(),
            default_output_format: "bogus".to_string(),
            ..AppSettings::default()
        };
        assert_eq!(cmd.resolve_depth(&settings), AnalysisDepth::Standard);
        assert_eq!(cmd.resolve_output(&settings), OutputFormat::Plain);
    }
}
