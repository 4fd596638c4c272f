//! Access to the archive tree: list directories, check for the per-list
//! index file and estimate on-disk size.

use crate::error::{NavError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source of archive directories.
///
/// Implemented over the real archive root by [`FsArchive`]; tests provide
/// in-memory listings.
pub trait ArchiveSource {
    /// Names of the entries directly under the archive root.
    fn list_directories(&self) -> Result<Vec<String>>;

    /// Whether `name` carries the per-list index file.
    fn has_index(&self, name: &str) -> bool;

    /// Estimated disk usage of `name`, in bytes.
    fn disk_usage(&self, name: &str) -> Result<u64>;
}

/// Archive rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsArchive {
    root: PathBuf,
    index_file: String,
}

impl FsArchive {
    pub fn new(root: impl Into<PathBuf>, index_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index_file: index_file.into(),
        }
    }
}

impl ArchiveSource for FsArchive {
    fn list_directories(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| NavError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| NavError::io(&self.root, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn has_index(&self, name: &str) -> bool {
        self.root.join(name).join(&self.index_file).exists()
    }

    fn disk_usage(&self, name: &str) -> Result<u64> {
        disk_usage(&self.root.join(name))
    }
}

/// Recursive disk usage of `path` as `du -k` reports it, scaled to bytes.
///
/// Allocated 512-byte blocks are summed over every entry, the directory itself
/// included, counting hard-linked files once. The total is rounded up to whole
/// kilobytes. This is an estimate of storage, not the byte length of the content.
pub fn disk_usage(path: &Path) -> Result<u64> {
    let mut seen = std::collections::HashSet::new();
    let mut bytes: u64 = 0;

    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(path).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            NavError::io(at, source)
        })?;
        let meta = entry.metadata().map_err(|e| {
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("metadata unavailable"));
            NavError::io(entry.path(), source)
        })?;

        if let Some(key) = inode_key(&meta) {
            if !seen.insert(key) {
                continue;
            }
        }
        bytes += allocated_bytes(&meta);
    }

    Ok(bytes.div_ceil(1024) * 1024)
}

#[cfg(unix)]
fn allocated_bytes(meta: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.blocks() * 512
}

#[cfg(not(unix))]
fn allocated_bytes(meta: &std::fs::Metadata) -> u64 {
    meta.len()
}

#[cfg(unix)]
fn inode_key(meta: &std::fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    (meta.nlink() > 1 && !meta.is_dir()).then(|| (meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn inode_key(_meta: &std::fs::Metadata) -> Option<(u64, u64)> {
    None
}
