//! Command-line driver for datefold.
//!
//! Ties the pieces together for one run:
//! - source validation
//! - configuration loading and filter compilation
//! - target root resolution
//! - the recursive image scan
//! - bucket assignment, copying and per-file progress lines
//! - the closing summary (text or JSON)

use crate::config::{CompiledFilters, OrganizeConfig};
use crate::date_bucket::{BucketAssignment, DateSource, assign_bucket};
use crate::file_organizer::{FileOrganizer, OrganizeError};
use crate::output::OutputFormatter;
use crate::scanner::scan_images;
use crate::summary::RunSummary;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Report what would be copied without creating or copying anything.
    pub dry_run: bool,
    /// Print only a JSON summary instead of the human-readable output.
    pub json: bool,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct OrganizeOutcome {
    pub source_dir: PathBuf,
    pub target_root: PathBuf,
    pub summary: RunSummary,
}

/// Organizes `source_dir` with default options and configuration lookup.
///
/// Prints an error and returns `false` when the run cannot start (for
/// example when the source directory does not exist). Per-file problems do
/// not make the run fail.
///
/// ```no_run
/// use datefold::cli::organize;
/// use std::path::Path;
///
/// if !organize(Path::new("/home/me/camera-dump")) {
///     eprintln!("nothing was organized");
/// }
/// ```
pub fn organize(source_dir: &Path) -> bool {
    match run_cli(source_dir, OrganizeOptions::default()) {
        Ok(_) => true,
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    }
}

/// Runs with the configuration found by the default lookup.
pub fn run_cli(source_dir: &Path, options: OrganizeOptions) -> Result<OrganizeOutcome, String> {
    run_cli_with_config(source_dir, options, None)
}

/// Runs with an explicit configuration file, if given.
pub fn run_cli_with_config(
    source_dir: &Path,
    options: OrganizeOptions,
    config_path: Option<&Path>,
) -> Result<OrganizeOutcome, String> {
    if !options.json {
        OutputFormatter::info(&format!("Organizing images in: {}", source_dir.display()));
    }

    // A missing source is reported before any configuration problem.
    if !source_dir.is_dir() {
        return Err(OrganizeError::SourceNotFound {
            path: source_dir.to_path_buf(),
        }
        .to_string());
    }

    let config = OrganizeConfig::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile_filters()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    organize_directory(source_dir, &config.output.target_dir_name, &filters, options)
}

/// Copies every eligible image under `source_dir` into its date bucket.
///
/// Steps:
/// 1. Resolve the target root beside the source; fail if the source is missing
/// 2. Create the target root and `unknown_date` (skipped on dry runs)
/// 3. Scan the source tree for image files
/// 4. Assign each file a bucket and copy it there
/// 5. Print the summary
pub fn organize_directory(
    source_dir: &Path,
    target_dir_name: &str,
    filters: &CompiledFilters,
    options: OrganizeOptions,
) -> Result<OrganizeOutcome, String> {
    let target_root =
        FileOrganizer::resolve_target_root(source_dir, target_dir_name).map_err(|e| e.to_string())?;

    if !options.dry_run {
        FileOrganizer::prepare_target_root(&target_root).map_err(|e| e.to_string())?;
    }

    let files = scan_images(source_dir, filters);
    log::info!(
        "found {} image files under {}",
        files.len(),
        source_dir.display()
    );

    let pb = if options.json {
        ProgressBar::hidden()
    } else {
        OutputFormatter::create_progress_bar(files.len() as u64)
    };

    let mut summary = RunSummary::new();

    for file in &files {
        pb.set_message(file.name.clone());
        let assignment = assign_bucket(&file.name, &file.path);
        let bucket_dir = FileOrganizer::bucket_dir(&target_root, &assignment.bucket);

        if options.dry_run {
            if !options.json {
                let line = progress_line("Would copy", &file.name, &assignment, &bucket_dir);
                pb.suspend(|| OutputFormatter::dry_run_notice(&line));
            }
            summary.record(file.name.clone(), assignment.bucket);
        } else {
            match FileOrganizer::copy_to_bucket(&target_root, &file.path, &assignment.bucket) {
                Ok(record) => {
                    if !options.json {
                        let line = progress_line("Copied", &file.name, &assignment, &bucket_dir);
                        pb.suspend(|| OutputFormatter::success(&line));
                    }
                    summary.record(file.name.clone(), record.bucket);
                }
                Err(e) => {
                    log::warn!("copy failed for {}: {}", file.path.display(), e);
                    pb.suspend(|| OutputFormatter::error(&e.to_string()));
                    summary.record_failure(&file.path, e.to_string());
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if options.json {
        let report = summary.to_report(source_dir, &target_root, options.dry_run);
        let json = report
            .to_json()
            .map_err(|e| format!("Error serializing summary: {}", e))?;
        println!("{}", json);
    } else {
        OutputFormatter::summary(
            &summary.bucket_counts(),
            summary.total_files(),
            &target_root,
            options.dry_run,
        );

        if !summary.failed().is_empty() {
            OutputFormatter::warning(&format!(
                "{} file(s) could not be copied. Please review errors above.",
                summary.failed().len()
            ));
        }
    }

    Ok(OrganizeOutcome {
        source_dir: source_dir.to_path_buf(),
        target_root,
        summary,
    })
}

/// Builds the per-file progress line for an assignment.
fn progress_line(
    verb: &str,
    file_name: &str,
    assignment: &BucketAssignment,
    bucket_dir: &Path,
) -> String {
    match &assignment.source {
        DateSource::FileName => {
            format!("{} {} to {}", verb, file_name, bucket_dir.display())
        }
        DateSource::ModifiedTime => format!(
            "{} {} to {} (using file modification time)",
            verb,
            file_name,
            bucket_dir.display()
        ),
        DateSource::Unavailable { reason } => format!(
            "{} {} to {} (unknown date, error: {})",
            verb,
            file_name,
            bucket_dir.display(),
            reason
        ),
    }
}
