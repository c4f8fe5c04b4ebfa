//! Migration between staging folders and the photo library
//!
//! - [`import`] moves the files of a folder into a same-named album
//! - [`export`] writes the assets of a same-named album back into a folder
//! - [`worker`] runs both on a background thread, one job at a time

pub mod album;
pub mod export;
pub mod import;
pub mod worker;

pub use album::{ResolvedAlbum, find_album, resolve, resolve_or_create};
pub use export::{ExportOutcome, ExportReport, ExportStatus, export_folder, select_resource};
pub use import::{ImportReport, ImportStatus, Transfer, import_folder, transfer_files};
pub use worker::{Job, JobOutcome, MigrationEvent, MigrationWorker};

use crate::error::{LibraryError, LogicError};
use crate::library::{AuthorizationStatus, PhotoLibrary};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Completed/total units of the batch in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total: total as u64,
        }
    }

    pub fn advance(&mut self) {
        self.completed = (self.completed + 1).min(self.total);
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// Units that did not complete
    pub fn shortfall(&self) -> u64 {
        self.total - self.completed
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Pipeline stages, in the order they are entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingAlbum,
    Transferring,
    FetchingResources,
    DeletingAssets,
    Finalizing,
}

/// Receives stage changes and progress from a running pipeline
pub trait MigrationObserver {
    fn stage(&mut self, _stage: Stage) {}

    fn progress(&mut self, _progress: Progress) {}
}

impl MigrationObserver for () {}

/// Make sure the library may be used, asking once if nobody decided yet
pub fn ensure_authorized(library: &mut dyn PhotoLibrary) -> Result<(), LibraryError> {
    let status = match library.authorization_status() {
        AuthorizationStatus::NotDetermined => {
            info!("Requesting photo library access");
            library.request_authorization()?
        }
        status => status,
    };

    match status {
        AuthorizationStatus::Authorized => Ok(()),
        _ => Err(LibraryError::AuthorizationDenied),
    }
}

/// Folders with a migration queued or running
#[derive(Debug, Clone, Default)]
pub struct MigrationGuard {
    active: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MigrationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `folder`; the claim is released when the returned value drops
    pub fn acquire(&self, folder: &Path) -> Result<ActiveMigration, LogicError> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(folder.to_path_buf()) {
            return Err(LogicError::MigrationInProgress {
                path: folder.to_path_buf(),
            });
        }
        debug!(folder = %folder.display(), "Migration claimed");
        Ok(ActiveMigration {
            guard: self.clone(),
            folder: folder.to_path_buf(),
        })
    }

    pub fn is_active(&self, folder: &Path) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(folder)
    }
}

/// Claim on a folder held for the lifetime of one migration
#[derive(Debug)]
pub struct ActiveMigration {
    guard: MigrationGuard,
    folder: PathBuf,
}

impl ActiveMigration {
    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl Drop for ActiveMigration {
    fn drop(&mut self) {
        self.guard
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.folder);
        debug!(folder = %self.folder.display(), "Migration released");
    }
}
