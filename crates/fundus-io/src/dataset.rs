//! Image discovery inside a dataset directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::IoError;

/// File extensions picked up by [`list_images`], compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["ppm", "tif", "jpg", "png"];

/// Whether `path` carries one of the [`SUPPORTED_EXTENSIONS`].
#[must_use]
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}

/// List the supported image files directly inside `dir`, sorted by path.
///
/// Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`IoError::ReadDir`] if `dir` (or one of its entries) cannot
/// be read.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let read_dir_error = |source: std::io::Error| IoError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        if path.is_file() && is_supported(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// File name without its extension, used to name every output of an image.
#[must_use]
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
