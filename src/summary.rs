//! Per-run bookkeeping for the end-of-run summary.

use crate::date_bucket::DateBucket;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// A file that could not be copied.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// What a run did, keyed by filename.
///
/// Files are keyed by name only, so two files with the same name in
/// different subdirectories share one entry (the later one wins), just as
/// they share one destination file.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    processed: HashMap<String, DateBucket>,
    failed: Vec<FailedFile>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the bucket a file was placed in.
    pub fn record(&mut self, file_name: impl Into<String>, bucket: DateBucket) {
        self.processed.insert(file_name.into(), bucket);
    }

    /// Records a file that could not be copied.
    pub fn record_failure(&mut self, path: &Path, error: impl Into<String>) {
        self.failed.push(FailedFile {
            path: path.to_path_buf(),
            error: error.into(),
        });
    }

    /// Bucket the named file ended up in, if any.
    pub fn bucket_of(&self, file_name: &str) -> Option<&DateBucket> {
        self.processed.get(file_name)
    }

    /// Number of files per bucket directory, sorted by directory name.
    pub fn bucket_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for bucket in self.processed.values() {
            *counts.entry(bucket.dir_name()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of distinct filenames processed.
    pub fn total_files(&self) -> usize {
        self.processed.len()
    }

    pub fn failed(&self) -> &[FailedFile] {
        &self.failed
    }

    /// Machine-readable form of the summary.
    pub fn to_report(&self, source: &Path, target_root: &Path, dry_run: bool) -> SummaryReport {
        SummaryReport {
            source: source.to_path_buf(),
            target_root: target_root.to_path_buf(),
            dry_run,
            total_files: self.total_files(),
            buckets: self.bucket_counts(),
            failed: self.failed.clone(),
        }
    }
}

/// Serializable summary printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub source: PathBuf,
    pub target_root: PathBuf,
    pub dry_run: bool,
    pub total_files: usize,
    pub buckets: BTreeMap<String, usize>,
    pub failed: Vec<FailedFile>,
}

impl SummaryReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
