//! File store used for staging folders
//!
//! The catalogs and pipelines only talk to the filesystem through
//! [`FileStore`], so tests can swap in a store that fails on demand.

use crate::error::FileSystemError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// What an enumerated entry turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File { len: u64 },
    /// The entry was enumerated but its metadata could not be read
    Unreadable { reason: String },
}

/// A direct child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl StoreEntry {
    /// UTF-8 name of the entry, if it has one
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Filesystem operations the catalogs and pipelines depend on
pub trait FileStore: Send + Sync {
    /// List direct children of `dir`, hidden entries excluded
    fn list_entries(&self, dir: &Path) -> Result<Vec<StoreEntry>, FileSystemError>;

    /// Create a single directory; fails if it already exists
    fn create_dir(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Remove a file or a whole directory tree
    fn remove_entry(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Write `data` to `path`, replacing any previous content
    fn write_bytes(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError>;

    fn file_exists(&self, path: &Path) -> bool;

    /// Set the modification time of an existing file
    fn set_modified(&self, path: &Path, time: SystemTime) -> Result<(), FileSystemError>;
}

/// [`FileStore`] backed by the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

impl FileStore for LocalFileStore {
    fn list_entries(&self, dir: &Path) -> Result<Vec<StoreEntry>, FileSystemError> {
        // walkdir reports a missing root as an entry error, surface it up front
        let root_meta = fs::metadata(dir).map_err(|e| FileSystemError::from_io(dir, e))?;
        if !root_meta.is_dir() {
            return Err(FileSystemError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let mut entries = Vec::new();
        for item in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
            let entry = match item {
                Ok(entry) => entry,
                Err(e) => {
                    if e.depth() == 0 {
                        let source = e
                            .into_io_error()
                            .unwrap_or_else(|| std::io::Error::other("directory loop"));
                        return Err(FileSystemError::from_io(dir, source));
                    }
                    let Some(path) = e.path().map(Path::to_path_buf) else {
                        continue;
                    };
                    debug!(?path, error = %e, "Entry could not be read");
                    entries.push(StoreEntry {
                        path,
                        kind: EntryKind::Unreadable {
                            reason: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            let path = entry.path().to_path_buf();
            if is_hidden(&path) {
                trace!(?path, "Skipping hidden entry");
                continue;
            }

            // Symlinks are classified by what they point at
            let kind = match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => EntryKind::Directory,
                Ok(meta) => EntryKind::File { len: meta.len() },
                Err(e) => EntryKind::Unreadable {
                    reason: e.to_string(),
                },
            };
            entries.push(StoreEntry { path, kind });
        }

        Ok(entries)
    }

    fn create_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        fs::create_dir(path).map_err(|e| FileSystemError::from_io(path, e))
    }

    fn remove_entry(&self, path: &Path) -> Result<(), FileSystemError> {
        let meta = fs::symlink_metadata(path).map_err(|e| FileSystemError::from_io(path, e))?;
        let result = if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|e| FileSystemError::from_io(path, e))
    }

    fn write_bytes(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError> {
        fs::write(path, data).map_err(|e| FileSystemError::from_io(path, e))
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn set_modified(&self, path: &Path, time: SystemTime) -> Result<(), FileSystemError> {
        filetime::set_file_mtime(path, filetime::FileTime::from_system_time(time))
            .map_err(|e| FileSystemError::from_io(path, e))
    }
}
