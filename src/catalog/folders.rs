//! Folder catalog: subfolders of the app-local albums root
//!
//! A folder's name is the title of the library album it migrates into.
//! The catalog works at any depth, so a folder holding folders can be
//! browsed as a collection of albums.

use super::{Listed, child_path, sort_listing};
use crate::error::FileSystemError;
use crate::store::{EntryKind, FileStore};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A staging folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub path: PathBuf,
    pub name: String,
    /// Regular, non-hidden files directly inside the folder
    pub file_count: usize,
    /// Subfolders directly inside the folder
    pub folder_count: usize,
}

/// Lists, creates and deletes folders under one parent directory
pub struct FolderCatalog<'a> {
    store: &'a dyn FileStore,
    root: PathBuf,
}

impl<'a> FolderCatalog<'a> {
    pub fn new(store: &'a dyn FileStore, root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Catalog of the folders nested inside `folder`
    pub fn nested(&self, folder: &Folder) -> FolderCatalog<'a> {
        FolderCatalog::new(self.store, folder.path.clone())
    }

    /// Make sure the root exists (first launch)
    pub fn ensure_root(&self) -> Result<(), FileSystemError> {
        if self.store.file_exists(&self.root) {
            return Ok(());
        }
        info!(root = %self.root.display(), "Creating albums root");
        match self.store.create_dir(&self.root) {
            Ok(()) | Err(FileSystemError::AlreadyExists { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Direct subfolders of the root, sorted by name
    pub fn list(&self) -> Result<Vec<Listed<Folder>>, FileSystemError> {
        let mut rows = Vec::new();

        for entry in self.store.list_entries(&self.root)? {
            match entry.kind {
                EntryKind::Directory => rows.push(self.describe(entry.path)),
                EntryKind::Unreadable { reason } => {
                    rows.push(Listed::Unreadable {
                        path: entry.path,
                        reason,
                    });
                }
                EntryKind::File { .. } => {}
            }
        }

        sort_listing(&mut rows, |f| f.name.as_str());
        debug!(root = %self.root.display(), count = rows.len(), "Listed folders");
        Ok(rows)
    }

    /// Find a folder by exact name
    pub fn find(&self, name: &str) -> Result<Option<Folder>, FileSystemError> {
        Ok(self
            .list()?
            .into_iter()
            .filter_map(Listed::into_entry)
            .find(|f| f.name == name))
    }

    /// Create a new, empty folder
    pub fn create(&self, name: &str) -> Result<Folder, FileSystemError> {
        let path = child_path(&self.root, name)?;
        self.store.create_dir(&path)?;
        info!(folder = %path.display(), "Created folder");

        let name = name.trim().to_string();
        Ok(Folder {
            path,
            name,
            file_count: 0,
            folder_count: 0,
        })
    }

    /// Remove a folder and everything inside it
    pub fn delete(&self, folder: &Folder) -> Result<(), FileSystemError> {
        self.store.remove_entry(&folder.path).inspect_err(|e| {
            warn!(folder = %folder.path.display(), error = %e, "Failed to delete folder");
        })?;
        info!(folder = %folder.path.display(), "Deleted folder");
        Ok(())
    }

    fn describe(&self, path: PathBuf) -> Listed<Folder> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            return Listed::Unreadable {
                path,
                reason: "folder name is not valid UTF-8".into(),
            };
        };

        let children = match self.store.list_entries(&path) {
            Ok(children) => children,
            Err(e) => {
                return Listed::Unreadable {
                    path,
                    reason: e.to_string(),
                };
            }
        };

        let file_count = children
            .iter()
            .filter(|c| matches!(c.kind, EntryKind::File { .. }))
            .count();
        let folder_count = children
            .iter()
            .filter(|c| c.kind == EntryKind::Directory)
            .count();

        Listed::Entry(Folder {
            path,
            name,
            file_count,
            folder_count,
        })
    }
}
