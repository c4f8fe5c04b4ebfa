//! File catalog: the staged photos inside one folder

use super::{Listed, sort_listing};
use crate::error::FileSystemError;
use crate::store::{EntryKind, FileStore};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A photo waiting in a folder to be imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

/// Whether a folder still has anything to migrate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderState {
    Empty,
    Populated(usize),
}

impl FolderState {
    /// Import is only offered for folders holding files
    pub fn can_import(&self) -> bool {
        matches!(self, FolderState::Populated(_))
    }

    /// Export is only offered into empty folders
    pub fn can_export(&self) -> bool {
        matches!(self, FolderState::Empty)
    }
}

/// Lists and deletes the regular files of one folder
pub struct FileCatalog<'a> {
    store: &'a dyn FileStore,
    folder: PathBuf,
}

impl<'a> FileCatalog<'a> {
    pub fn new(store: &'a dyn FileStore, folder: impl Into<PathBuf>) -> Self {
        Self {
            store,
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Regular, non-hidden files sorted by name
    pub fn list(&self) -> Result<Vec<Listed<StagedFile>>, FileSystemError> {
        let mut rows = Vec::new();

        for entry in self.store.list_entries(&self.folder)? {
            match entry.kind {
                EntryKind::File { len } => {
                    let name = entry.name().map(str::to_string);
                    match name {
                        Some(name) => rows.push(Listed::Entry(StagedFile {
                            path: entry.path,
                            name,
                            size: len,
                        })),
                        None => rows.push(Listed::Unreadable {
                            path: entry.path,
                            reason: "file name is not valid UTF-8".into(),
                        }),
                    }
                }
                EntryKind::Unreadable { reason } => rows.push(Listed::Unreadable {
                    path: entry.path,
                    reason,
                }),
                EntryKind::Directory => {}
            }
        }

        sort_listing(&mut rows, |f| f.name.as_str());
        debug!(folder = %self.folder.display(), count = rows.len(), "Listed files");
        Ok(rows)
    }

    /// Only the readable files, in listing order
    pub fn staged_files(&self) -> Result<Vec<StagedFile>, FileSystemError> {
        Ok(self.list()?.into_iter().filter_map(Listed::into_entry).collect())
    }

    /// Find a file by exact name
    pub fn find(&self, name: &str) -> Result<Option<StagedFile>, FileSystemError> {
        Ok(self.staged_files()?.into_iter().find(|f| f.name == name))
    }

    pub fn delete(&self, file: &StagedFile) -> Result<(), FileSystemError> {
        self.store.remove_entry(&file.path).inspect_err(|e| {
            warn!(file = %file.path.display(), error = %e, "Failed to delete file");
        })?;
        info!(file = %file.path.display(), "Deleted file");
        Ok(())
    }

    /// Emptiness from a fresh listing
    pub fn state(&self) -> Result<FolderState, FileSystemError> {
        let count = self.list()?.len();
        Ok(if count == 0 {
            FolderState::Empty
        } else {
            FolderState::Populated(count)
        })
    }
}
