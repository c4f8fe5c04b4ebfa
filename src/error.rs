//! Error types for the photos migrator
//!
//! Errors are grouped by the collaborator that produced them: the file
//! store, the photo library, or the migration logic itself.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for photos migrator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the file store
#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Invalid name: {name:?}")]
    InvalidName { name: String },

    #[error("I/O error at {path}: {source}")]
    Unknown {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileSystemError {
    /// Classify an I/O error raised while touching `path`
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => FileSystemError::NotFound { path },
            io::ErrorKind::PermissionDenied => FileSystemError::PermissionDenied { path },
            io::ErrorKind::AlreadyExists => FileSystemError::AlreadyExists { path },
            _ => FileSystemError::Unknown { path, source },
        }
    }
}

/// Failures reported by the photo library
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Photo library access has not been granted")]
    AuthorizationDenied,

    #[error("Library change batch failed: {message}")]
    BatchFailed { message: String },

    #[error("Failed to fetch resource {filename}: {message}")]
    ResourceFetchFailed { filename: String, message: String },

    #[error("{entity} not found in library: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Library error: {0}")]
    Unknown(String),
}

impl LibraryError {
    pub fn batch(message: impl Into<String>) -> Self {
        LibraryError::BatchFailed {
            message: message.into(),
        }
    }
}

/// Failures of the migration workflow itself
#[derive(Error, Debug)]
pub enum LogicError {
    #[error("Could not resolve library album {title:?}")]
    AlbumResolutionFailed { title: String },

    #[error("Creation of photo album {title:?} failed")]
    AlbumCreationFailed {
        title: String,
        #[source]
        source: LibraryError,
    },

    #[error("A migration is already running for {path}")]
    MigrationInProgress { path: PathBuf },

    #[error("Folder {path} has no photos to import")]
    EmptyFolder { path: PathBuf },

    #[error("Title must not be blank")]
    BlankTitle,

    #[error("Migration worker has stopped")]
    WorkerStopped,
}

/// Main error type for the photos migrator
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Logic(#[from] LogicError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
