//! Object key / local path conventions.
//!
//! Pure string and path functions. No AWS SDK dependency.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

pub const DEFAULT_DOWNLOAD_DIR: &str = ".";

/// Where a downloaded object lands on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    /// Write to exactly this path.
    Path(PathBuf),
    /// Write to `<dir>/<basename of key>`.
    Dir(PathBuf),
}

impl Default for DownloadTarget {
    fn default() -> Self {
        DownloadTarget::Dir(PathBuf::from(DEFAULT_DOWNLOAD_DIR))
    }
}

impl DownloadTarget {
    /// Resolve the destination file for `key`.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, CoreError> {
        match self {
            DownloadTarget::Path(path) => Ok(path.clone()),
            DownloadTarget::Dir(dir) => Ok(dir.join(file_name(key)?)),
        }
    }
}

/// Last path segment of a key: `uploads/2024/a.txt` -> `a.txt`.
pub fn file_name(key: &str) -> Result<&str, CoreError> {
    Path::new(key)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CoreError::NoFileName(key.to_string()))
}
