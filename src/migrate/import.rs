//! Import: folder files into the same-named album
//!
//! Every file is its own library batch (create asset, add to album), and
//! its source is removed only once that batch succeeded. A file whose
//! batch fails stays in the folder for a later retry.

use super::album::{ResolvedAlbum, resolve_or_create};
use super::{MigrationObserver, Progress, Stage, ensure_authorized};
use crate::catalog::{FileCatalog, Folder, Listed, StagedFile};
use crate::error::{Error, LogicError, Result};
use crate::library::{AlbumId, ChangeBatch, PhotoLibrary};
use crate::store::FileStore;
use tracing::{debug, error, info, warn};

/// Files left over and files moved by a sequential transfer
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Transfer {
    pub remaining: Vec<StagedFile>,
    pub imported: usize,
}

/// Attempt every file in order; failures are kept, successes counted
pub fn transfer_files<F>(files: Vec<StagedFile>, mut attempt: F) -> Transfer
where
    F: FnMut(&StagedFile) -> Result<()>,
{
    files.into_iter().fold(Transfer::default(), |mut transfer, file| {
        match attempt(&file) {
            Ok(()) => transfer.imported += 1,
            Err(e) => {
                warn!(file = %file.name, error = %e, "File not imported");
                transfer.remaining.push(file);
            }
        }
        transfer
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// Every file moved
    Done,
    /// Some files are still in the folder
    Partial,
}

/// Result of importing one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub album: AlbumId,
    pub album_created: bool,
    pub imported: usize,
    /// Files whose transfer failed, still in the folder
    pub remaining: Vec<StagedFile>,
    /// Entries that could not even be listed
    pub unreadable: usize,
    pub progress: Progress,
}

impl ImportReport {
    pub fn status(&self) -> ImportStatus {
        if self.not_processed() == 0 {
            ImportStatus::Done
        } else {
            ImportStatus::Partial
        }
    }

    pub fn not_processed(&self) -> usize {
        self.remaining.len() + self.unreadable
    }
}

/// Move every file of `folder` into the album titled after it
pub fn import_folder(
    library: &mut dyn PhotoLibrary,
    store: &dyn FileStore,
    folder: &Folder,
    observer: &mut dyn MigrationObserver,
) -> Result<ImportReport> {
    ensure_authorized(library)?;

    let listing = FileCatalog::new(store, &folder.path).list()?;
    let unreadable = listing.iter().filter(|row| row.is_unreadable()).count();
    let files: Vec<StagedFile> = listing.into_iter().filter_map(Listed::into_entry).collect();
    if files.is_empty() && unreadable == 0 {
        return Err(LogicError::EmptyFolder {
            path: folder.path.clone(),
        }
        .into());
    }

    info!(folder = %folder.name, files = files.len(), "Starting import");
    observer.stage(Stage::ResolvingAlbum);
    let ResolvedAlbum { id: album, created } =
        resolve_or_create(library, &folder.name).inspect_err(|e| {
            error!(folder = %folder.name, error = %e, "Import aborted");
        })?;

    observer.stage(Stage::Transferring);
    let mut progress = Progress::new(files.len());
    observer.progress(progress);

    let transfer = transfer_files(files, |file| {
        transfer_file(library, store, &album, file)?;
        progress.advance();
        observer.progress(progress);
        Ok(())
    });

    observer.stage(Stage::Finalizing);
    let report = ImportReport {
        album,
        album_created: created,
        imported: transfer.imported,
        remaining: transfer.remaining,
        unreadable,
        progress,
    };

    match report.status() {
        ImportStatus::Done => info!(
            folder = %folder.name,
            imported = report.imported,
            album_created = report.album_created,
            "Import finished"
        ),
        ImportStatus::Partial => warn!(
            folder = %folder.name,
            imported = report.imported,
            not_processed = report.not_processed(),
            "Import finished with files left behind"
        ),
    }
    Ok(report)
}

/// One file: library batch first, source removal second
fn transfer_file(
    library: &mut dyn PhotoLibrary,
    store: &dyn FileStore,
    album: &AlbumId,
    file: &StagedFile,
) -> Result<()> {
    let mut batch = ChangeBatch::new();
    let asset = batch.create_asset_from_file(&file.path);
    batch.add_assets_to_album(album, [asset]);
    let receipt = library.perform_changes(batch)?;

    if let Err(e) = store.remove_entry(&file.path) {
        // The file stays, so the asset must not exist twice after a retry
        if let Some(created) = receipt.asset(asset) {
            let mut undo = ChangeBatch::new();
            undo.delete_assets([created.clone()]);
            if let Err(undo_err) = library.perform_changes(undo) {
                error!(
                    file = %file.name,
                    asset = %created,
                    error = %undo_err,
                    "Failed to roll back imported asset"
                );
            }
        }
        return Err(Error::from(e));
    }

    debug!(file = %file.name, "Imported file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileSystemError;
    use std::path::PathBuf;

    fn staged(name: &str) -> StagedFile {
        StagedFile {
            path: PathBuf::from("/albums/Trip").join(name),
            name: name.to_string(),
            size: 1,
        }
    }

    #[test]
    fn test_transfer_keeps_failures_in_order() {
        let files = vec![staged("a.jpg"), staged("b.jpg"), staged("c.jpg"), staged("d.jpg")];
        let mut attempted = Vec::new();

        let transfer = transfer_files(files, |file| {
            attempted.push(file.name.clone());
            if file.name == "b.jpg" || file.name == "d.jpg" {
                Err(FileSystemError::PermissionDenied {
                    path: file.path.clone(),
                }
                .into())
            } else {
                Ok(())
            }
        });

        assert_eq!(attempted, vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
        assert_eq!(transfer.imported, 2);
        assert_eq!(transfer.remaining, vec![staged("b.jpg"), staged("d.jpg")]);
    }

    #[test]
    fn test_transfer_of_nothing() {
        let transfer = transfer_files(Vec::new(), |_| Ok(()));
        assert_eq!(transfer, Transfer::default());
    }

    #[test]
    fn test_report_status() {
        let mut report = ImportReport {
            album: AlbumId::new("album-000001"),
            album_created: false,
            imported: 2,
            remaining: Vec::new(),
            unreadable: 0,
            progress: Progress::new(2),
        };
        assert_eq!(report.status(), ImportStatus::Done);

        report.unreadable = 1;
        assert_eq!(report.status(), ImportStatus::Partial);
        assert_eq!(report.not_processed(), 1);
    }
}
