//! Folder and file catalogs over the staging area
//!
//! Listings are always re-read from the file store; nothing here caches
//! entries between calls.

pub mod files;
pub mod folders;

pub use files::{FileCatalog, FolderState, StagedFile};
pub use folders::{Folder, FolderCatalog};

use crate::error::FileSystemError;
use std::path::{Path, PathBuf};

/// One row of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listed<T> {
    Entry(T),
    /// Enumerated, but its name or metadata could not be read
    Unreadable { path: PathBuf, reason: String },
}

impl<T> Listed<T> {
    pub fn entry(&self) -> Option<&T> {
        match self {
            Listed::Entry(item) => Some(item),
            Listed::Unreadable { .. } => None,
        }
    }

    pub fn into_entry(self) -> Option<T> {
        match self {
            Listed::Entry(item) => Some(item),
            Listed::Unreadable { .. } => None,
        }
    }

    pub fn is_unreadable(&self) -> bool {
        matches!(self, Listed::Unreadable { .. })
    }
}

/// Order rows by name, unreadable rows last (ordered by path)
pub(crate) fn sort_listing<T>(rows: &mut [Listed<T>], name: impl Fn(&T) -> &str) {
    rows.sort_by(|a, b| match (a, b) {
        (Listed::Entry(x), Listed::Entry(y)) => name(x).cmp(name(y)),
        (Listed::Entry(_), Listed::Unreadable { .. }) => std::cmp::Ordering::Less,
        (Listed::Unreadable { .. }, Listed::Entry(_)) => std::cmp::Ordering::Greater,
        (Listed::Unreadable { path: p, .. }, Listed::Unreadable { path: q, .. }) => p.cmp(q),
    });
}

/// Validate a user-supplied folder name and join it onto `parent`
pub(crate) fn child_path(parent: &Path, name: &str) -> Result<PathBuf, FileSystemError> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.starts_with('.')
        || trimmed.contains(['/', '\\'])
        || trimmed.contains('\0');
    if invalid {
        return Err(FileSystemError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(parent.join(trimmed))
}
