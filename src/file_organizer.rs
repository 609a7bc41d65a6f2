/// Copying images into their date bucket directories.
///
/// This module resolves the target root next to the source directory, creates
/// bucket directories on demand and copies files into them, carrying over
/// permission bits and access/modification times. Source files are only ever
/// read.
use crate::date_bucket::DateBucket;
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};

/// Record of a single copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRecord {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub bucket: DateBucket,
}

/// Errors that can occur while organizing files.
#[derive(Debug)]
pub enum OrganizeError {
    /// The source directory does not exist or is not a directory.
    SourceNotFound { path: PathBuf },
    /// The source directory could not be resolved to an absolute path.
    InvalidSourcePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create the target root or a bucket directory.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to copy a file into its bucket directory.
    FileCopyFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The destination is the source file itself, e.g. when the output
    /// folder is organized again. Copying would truncate it.
    SameFile { path: PathBuf },
    /// The copy succeeded but its timestamps could not be set.
    TimestampPreservationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound { path } => {
                write!(f, "Source directory '{}' does not exist.", path.display())
            }
            Self::InvalidSourcePath { path, source } => {
                write!(f, "Invalid source path {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileCopyFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::SameFile { path } => {
                write!(
                    f,
                    "{} is already in its bucket directory, not copying onto itself",
                    path.display()
                )
            }
            Self::TimestampPreservationFailed { path, source } => {
                write!(
                    f,
                    "Failed to preserve timestamps on {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for organize operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Creates bucket directories and copies files into them.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Resolves the target root for a source directory without touching the
    /// filesystem beyond canonicalizing the source.
    ///
    /// The target is `<parent of the absolute source>/<target_dir_name>`. A
    /// source with no parent (the filesystem root) uses itself as the parent.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use datefold::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let target = FileOrganizer::resolve_target_root(Path::new("/home/me/photos"), "organized")
    ///     .unwrap();
    /// assert_eq!(target, Path::new("/home/me/organized"));
    /// ```
    pub fn resolve_target_root(source_dir: &Path, target_dir_name: &str) -> OrganizeResult<PathBuf> {
        if !source_dir.is_dir() {
            return Err(OrganizeError::SourceNotFound {
                path: source_dir.to_path_buf(),
            });
        }

        let absolute =
            fs::canonicalize(source_dir).map_err(|e| OrganizeError::InvalidSourcePath {
                path: source_dir.to_path_buf(),
                source: e,
            })?;
        let parent = absolute.parent().unwrap_or(absolute.as_path());

        Ok(parent.join(target_dir_name))
    }

    /// Creates the target root and its `unknown_date` bucket.
    ///
    /// Both are created eagerly and reused if they already exist.
    pub fn prepare_target_root(target_root: &Path) -> OrganizeResult<()> {
        Self::ensure_dir(target_root)?;
        Self::ensure_dir(&target_root.join(DateBucket::Unknown.dir_name()))
    }

    /// Returns the directory a bucket maps to under the target root.
    pub fn bucket_dir(target_root: &Path, bucket: &DateBucket) -> PathBuf {
        target_root.join(bucket.dir_name())
    }

    /// Copies a file into its bucket directory and returns what was done.
    ///
    /// The bucket directory is created if missing. An existing file with the
    /// same name in the bucket is overwritten, unless it is the source file
    /// itself, which is reported as [`OrganizeError::SameFile`]. Permission
    /// bits are copied by `fs::copy`; access and modification times are set
    /// afterwards.
    pub fn copy_to_bucket(
        target_root: &Path,
        file_path: &Path,
        bucket: &DateBucket,
    ) -> OrganizeResult<CopyRecord> {
        let bucket_path = Self::bucket_dir(target_root, bucket);
        Self::ensure_dir(&bucket_path)?;

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileCopyFailure {
                source: file_path.to_path_buf(),
                destination: bucket_path.clone(),
                source_error: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;
        let destination_path = bucket_path.join(file_name);

        if is_same_file(file_path, &destination_path) {
            return Err(OrganizeError::SameFile {
                path: file_path.to_path_buf(),
            });
        }

        fs::copy(file_path, &destination_path).map_err(|e| OrganizeError::FileCopyFailure {
            source: file_path.to_path_buf(),
            destination: destination_path.clone(),
            source_error: e,
        })?;

        Self::copy_times(file_path, &destination_path)?;

        Ok(CopyRecord {
            source_path: file_path.to_path_buf(),
            destination_path,
            bucket: bucket.clone(),
        })
    }

    fn copy_times(source: &Path, destination: &Path) -> OrganizeResult<()> {
        let metadata =
            fs::metadata(source).map_err(|e| OrganizeError::TimestampPreservationFailed {
                path: destination.to_path_buf(),
                source: e,
            })?;
        let accessed = FileTime::from_last_access_time(&metadata);
        let modified = FileTime::from_last_modification_time(&metadata);

        filetime::set_file_times(destination, accessed, modified).map_err(|e| {
            OrganizeError::TimestampPreservationFailed {
                path: destination.to_path_buf(),
                source: e,
            }
        })
    }

    fn ensure_dir(path: &Path) -> OrganizeResult<()> {
        fs::create_dir_all(path).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// True when both paths resolve to the same file on disk. A missing
/// destination is never the same file.
#[cfg(unix)]
fn is_same_file(source: &Path, destination: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(source), fs::metadata(destination)) {
        (Ok(src), Ok(dst)) => src.dev() == dst.dev() && src.ino() == dst.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn is_same_file(source: &Path, destination: &Path) -> bool {
    match (fs::canonicalize(source), fs::canonicalize(destination)) {
        (Ok(src), Ok(dst)) => src == dst,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_target_root_is_sibling_of_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("photos");
        fs::create_dir(&source).unwrap();

        let target = FileOrganizer::resolve_target_root(&source, "organized").unwrap();
        let expected = fs::canonicalize(temp_dir.path()).unwrap().join("organized");
        assert_eq!(target, expected);
        // Resolving alone creates nothing.
        assert!(!target.exists());
    }

    #[test]
    fn test_resolve_target_root_with_trailing_components() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("photos");
        fs::create_dir_all(source.join("sub")).unwrap();

        let target =
            FileOrganizer::resolve_target_root(&source.join("sub").join(".."), "organized")
                .unwrap();
        let expected = fs::canonicalize(temp_dir.path()).unwrap().join("organized");
        assert_eq!(target, expected);
    }

    #[test]
    fn test_resolve_target_root_missing_source() {
        let result = FileOrganizer::resolve_target_root(Path::new("/non/existent/path"), "organized");
        assert!(matches!(result, Err(OrganizeError::SourceNotFound { .. })));
    }

    #[test]
    fn test_resolve_target_root_rejects_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("photo.jpg");
        fs::write(&file, b"x").unwrap();

        let result = FileOrganizer::resolve_target_root(&file, "organized");
        assert!(matches!(result, Err(OrganizeError::SourceNotFound { .. })));
    }

    #[test]
    fn test_prepare_target_root_creates_unknown_bucket() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("organized");

        FileOrganizer::prepare_target_root(&target).unwrap();
        assert!(target.join("unknown_date").is_dir());

        // Second call reuses the existing directories.
        FileOrganizer::prepare_target_root(&target).unwrap();
    }

    #[test]
    fn test_copy_to_bucket_keeps_original() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("src.jpg");
        fs::write(&source, b"image bytes").unwrap();
        let target = temp_dir.path().join("organized");

        let record =
            FileOrganizer::copy_to_bucket(&target, &source, &DateBucket::year_month("2023", "05"))
                .unwrap();

        assert_eq!(record.destination_path, target.join("2023-05").join("src.jpg"));
        assert_eq!(fs::read(&record.destination_path).unwrap(), b"image bytes");
        assert!(source.exists());
        assert_eq!(fs::read(&source).unwrap(), b"image bytes");
    }

    #[test]
    fn test_copy_to_bucket_overwrites_existing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("organized");
        fs::create_dir_all(target.join("2020-01")).unwrap();
        fs::write(target.join("2020-01").join("a.png"), b"old").unwrap();

        let source = temp_dir.path().join("a.png");
        fs::write(&source, b"new").unwrap();

        FileOrganizer::copy_to_bucket(&target, &source, &DateBucket::year_month("2020", "01"))
            .unwrap();
        assert_eq!(fs::read(target.join("2020-01").join("a.png")).unwrap(), b"new");
    }

    #[test]
    fn test_copy_to_bucket_preserves_modification_time() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("old.jpg");
        fs::write(&source, b"x").unwrap();
        let mtime = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&source, mtime).unwrap();

        let record = FileOrganizer::copy_to_bucket(
            &temp_dir.path().join("organized"),
            &source,
            &DateBucket::Unknown,
        )
        .unwrap();

        let copied = fs::metadata(&record.destination_path).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&copied), mtime);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_to_bucket_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let source = temp_dir.path().join("mode.png");
        fs::write(&source, b"x").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o640)).unwrap();

        let record = FileOrganizer::copy_to_bucket(
            &temp_dir.path().join("organized"),
            &source,
            &DateBucket::year_month("2024", "02"),
        )
        .unwrap();

        let mode = fs::metadata(&record.destination_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_copy_onto_itself_is_refused() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("organized");
        let bucket_dir = target.join("2023-05");
        fs::create_dir_all(&bucket_dir).unwrap();
        let file = bucket_dir.join("IMG-20230515-WA001.jpg");
        fs::write(&file, b"keep me").unwrap();

        let result =
            FileOrganizer::copy_to_bucket(&target, &file, &DateBucket::year_month("2023", "05"));

        assert!(matches!(result, Err(OrganizeError::SameFile { .. })));
        assert_eq!(fs::read(&file).unwrap(), b"keep me");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = FileOrganizer::copy_to_bucket(
            &temp_dir.path().join("organized"),
            &temp_dir.path().join("gone.jpg"),
            &DateBucket::Unknown,
        );
        assert!(matches!(result, Err(OrganizeError::FileCopyFailure { .. })));
    }
}
