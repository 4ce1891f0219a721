//! Resolving the images a run should process.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::InputError;

/// Image extensions accepted as input (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// Where the images of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// One explicit image
    File(PathBuf),
    /// Every supported image directly inside a directory
    Directory(PathBuf),
}

impl InputSource {
    pub fn path(&self) -> &Path {
        match self {
            InputSource::File(path) | InputSource::Directory(path) => path,
        }
    }
}

/// Resolve an input source to the ordered list of images to process.
///
/// Directories are listed non-recursively and sorted by path. An empty
/// result is an error: a run with nothing to do is almost always a mistake.
/// Paths must be valid UTF-8, since each one is stored in a JSON record.
pub fn discover(source: &InputSource) -> Result<Vec<PathBuf>, InputError> {
    match source {
        InputSource::File(path) => discover_file(path).map(|p| vec![p]),
        InputSource::Directory(path) => discover_dir(path),
    }
}

fn discover_file(path: &Path) -> Result<PathBuf, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(InputError::NotAFile(path.to_path_buf()));
    }
    if path.to_str().is_none() {
        return Err(InputError::NonUtf8Path(path.to_path_buf()));
    }
    if !is_supported(path) {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(InputError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        });
    }
    Ok(path.to_path_buf())
}

fn discover_dir(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    if !dir.exists() {
        return Err(InputError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(InputError::NotADirectory(dir.to_path_buf()));
    }
    if dir.to_str().is_none() {
        return Err(InputError::NonUtf8Path(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(InputError::Unreadable {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };
        let entry_path = entry.path();
        if entry_path.to_str().is_none() {
            tracing::warn!("Skipping {:?}: file name is not valid UTF-8", entry_path);
            continue;
        }
        if entry_path.is_file() && is_supported(entry_path) {
            files.push(entry_path.to_path_buf());
        } else {
            tracing::trace!("Skipping {:?}", entry_path);
        }
    }

    if files.is_empty() {
        return Err(InputError::NoImages(dir.to_path_buf()));
    }

    // Sort by path for deterministic ordering
    files.sort();
    Ok(files)
}

/// Check if a file has a supported extension.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.iter().any(|fmt| *fmt == ext_lower)
        })
        .unwrap_or(false)
}
