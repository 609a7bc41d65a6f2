//! Console output for datefold.
//!
//! All user-facing text goes through [`OutputFormatter`] so the look of a
//! run (colors, glyphs, the progress bar, the summary block) lives in one
//! place. Diagnostics that are not part of the normal output use `log`.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::Path;

/// Prints styled status lines and the end-of-run summary.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message with a green checkmark.
    ///
    /// ```no_run
    /// use datefold::output::OutputFormatter;
    /// OutputFormatter::success("Copied photo.jpg to /tmp/organized/2023-05");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message to stderr with a red X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header preceded by a blank line.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run line.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for the copy loop.
    ///
    /// The bar draws to stderr and stays invisible when stderr is not a
    /// terminal. Print through [`ProgressBar::suspend`] while it is active.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints the bucket counts, total and target location.
    ///
    /// ```no_run
    /// use datefold::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    /// use std::path::Path;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("2023-05".to_string(), 2);
    /// counts.insert("unknown_date".to_string(), 1);
    /// OutputFormatter::summary(&counts, 3, Path::new("/tmp/organized"), false);
    /// ```
    pub fn summary(
        bucket_counts: &BTreeMap<String, usize>,
        total_files: usize,
        target_root: &Path,
        dry_run: bool,
    ) {
        if dry_run {
            Self::header("[DRY RUN] Summary of organization:");
        } else {
            Self::header("Summary of organization:");
        }

        for (bucket, count) in bucket_counts {
            println!("{}", bucket_line(bucket, *count));
        }

        println!(
            "\nTotal files processed: {}",
            total_files.to_string().green().bold()
        );
        if dry_run {
            println!("\nFiles would be organized in: {}", target_root.display());
        } else {
            println!("\nOrganized files are in: {}", target_root.display());
        }
    }
}

/// One summary row. The count is always followed by "files".
fn bucket_line(bucket: &str, count: usize) -> String {
    format!("{}: {} files", bucket, count)
}
