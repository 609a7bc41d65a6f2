/// Recursive discovery of image files under a source directory.
use crate::config::CompiledFilters;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognised as images. Matched case-insensitively against the
/// end of the filename.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp"];

/// An eligible file found during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// The file's name, used as the destination name and summary key.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
}

/// Returns true when the filename ends with a known image extension.
pub fn is_image_file_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Walks `source_dir` recursively and returns every eligible image file in
/// walk order.
///
/// Unreadable directory entries are skipped. Symlinks are not followed into
/// directories, but a symlink pointing at a regular file is treated as that
/// file.
pub fn scan_images(source_dir: &Path, filters: &CompiledFilters) -> Vec<ImageFile> {
    WalkDir::new(source_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| {
            let file_type = entry.file_type();
            file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
        })
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if !is_image_file_name(&name) {
                log::debug!("not an image, skipping {}", entry.path().display());
                return None;
            }

            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .unwrap_or(entry.path());
            if !filters.should_include(relative) {
                log::debug!("excluded by filters: {}", relative.display());
                return None;
            }

            Some(ImageFile {
                name,
                path: entry.into_path(),
            })
        })
        .collect()
}
