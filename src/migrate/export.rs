//! Export: assets of the same-named album into a folder
//!
//! Every asset's primary resource is written under its original name,
//! then all assets fetched for the album are deleted from the library in
//! one batch.

use super::album::find_album;
use super::{MigrationObserver, Progress, Stage, ensure_authorized};
use crate::catalog::Folder;
use crate::error::{Error, FileSystemError, LibraryError, Result};
use crate::library::{Album, Asset, AssetId, ChangeBatch, PhotoLibrary, Resource, ResourceKind};
use crate::store::FileStore;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// Resource kinds worth exporting, most preferred first
const PREFERRED_KINDS: [ResourceKind; 4] = [
    ResourceKind::FullSizePhoto,
    ResourceKind::FullSizeVideo,
    ResourceKind::Photo,
    ResourceKind::Video,
];

/// Representation of an asset to write out
pub fn select_resource(resources: &[Resource]) -> Option<&Resource> {
    PREFERRED_KINDS
        .iter()
        .find_map(|kind| resources.iter().find(|r| r.kind == *kind))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    /// Every fetched asset was written
    Done,
    /// `shortfall` assets were not written
    Partial { shortfall: u64 },
}

/// Result of exporting into one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub album: Album,
    pub exported: usize,
    /// Assets whose file name already existed in the folder
    pub skipped: usize,
    pub failed: usize,
    /// Assets requested for deletion from the library
    pub deleted: Vec<AssetId>,
    /// Whether the deletion batch was committed
    pub assets_deleted: bool,
    pub progress: Progress,
}

impl ExportReport {
    pub fn status(&self) -> ExportStatus {
        if self.progress.is_complete() {
            ExportStatus::Done
        } else {
            ExportStatus::Partial {
                shortfall: self.progress.shortfall(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// No top-level album has the folder's name; nothing was touched
    NotFound { title: String },
    Exported(ExportReport),
}

enum AssetExport {
    Written(PathBuf),
    Skipped(PathBuf),
}

/// Write the album titled after `folder` into it, then empty the album
pub fn export_folder(
    library: &mut dyn PhotoLibrary,
    store: &dyn FileStore,
    folder: &Folder,
    observer: &mut dyn MigrationObserver,
) -> Result<ExportOutcome> {
    ensure_authorized(library)?;

    observer.stage(Stage::ResolvingAlbum);
    let Some(album) = find_album(library, &folder.name)? else {
        info!(folder = %folder.name, "No album to export");
        return Ok(ExportOutcome::NotFound {
            title: folder.name.clone(),
        });
    };

    let assets = library.fetch_assets(&album.id)?;
    info!(folder = %folder.name, assets = assets.len(), "Starting export");

    observer.stage(Stage::FetchingResources);
    let mut progress = Progress::new(assets.len());
    observer.progress(progress);

    let (mut exported, mut skipped, mut failed) = (0, 0, 0);
    for asset in &assets {
        match export_asset(library, store, &folder.path, asset) {
            Ok(AssetExport::Written(path)) => {
                debug!(file = %path.display(), "Exported asset");
                exported += 1;
                progress.advance();
                observer.progress(progress);
            }
            Ok(AssetExport::Skipped(path)) => {
                info!(file = %path.display(), "File already exists, asset skipped");
                skipped += 1;
            }
            Err(e) => {
                warn!(asset = %asset.id, file = %asset.filename, error = %e, "Asset not exported");
                failed += 1;
            }
        }
    }

    observer.stage(Stage::DeletingAssets);
    let deleted: Vec<AssetId> = assets.iter().map(|a| a.id.clone()).collect();
    let assets_deleted = delete_assets(library, &deleted);

    observer.stage(Stage::Finalizing);
    let report = ExportReport {
        album,
        exported,
        skipped,
        failed,
        deleted,
        assets_deleted,
        progress,
    };

    match report.status() {
        ExportStatus::Done => info!(folder = %folder.name, exported, "Export finished"),
        ExportStatus::Partial { shortfall } => warn!(
            folder = %folder.name,
            exported,
            skipped,
            failed,
            shortfall,
            "Export finished with assets not written"
        ),
    }
    Ok(ExportOutcome::Exported(report))
}

fn delete_assets(library: &mut dyn PhotoLibrary, assets: &[AssetId]) -> bool {
    if assets.is_empty() {
        return true;
    }

    let mut batch = ChangeBatch::new();
    batch.delete_assets(assets.iter().cloned());
    match library.perform_changes(batch) {
        Ok(_) => {
            info!(count = assets.len(), "Deleted exported assets from library");
            true
        }
        Err(e) => {
            error!(count = assets.len(), error = %e, "Failed to delete assets from library");
            false
        }
    }
}

fn export_asset(
    library: &dyn PhotoLibrary,
    store: &dyn FileStore,
    dir: &Path,
    asset: &Asset,
) -> Result<AssetExport> {
    let resources = library.fetch_asset_resources(&asset.id)?;
    let resource = select_resource(&resources).ok_or_else(|| {
        Error::from(LibraryError::ResourceFetchFailed {
            filename: asset.filename.clone(),
            message: "no exportable resource".into(),
        })
    })?;

    // Only the final component, whatever the library reports
    let name = Path::new(&resource.filename)
        .file_name()
        .ok_or_else(|| FileSystemError::InvalidName {
            name: resource.filename.clone(),
        })?;
    let destination = dir.join(name);
    if store.file_exists(&destination) {
        return Ok(AssetExport::Skipped(destination));
    }

    let write = || -> Result<()> {
        let data = library.read_resource(resource)?;
        store.write_bytes(&destination, &data)?;
        Ok(())
    };
    if let Err(e) = write() {
        if store.file_exists(&destination) {
            if let Err(cleanup) = store.remove_entry(&destination) {
                warn!(file = %destination.display(), error = %cleanup, "Failed to remove partial file");
            }
        }
        return Err(e);
    }

    let created = SystemTime::from(asset.created_at.and_utc());
    if let Err(e) = store.set_modified(&destination, created) {
        warn!(file = %destination.display(), error = %e, "Failed to set modification time");
    }
    Ok(AssetExport::Written(destination))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(kind: ResourceKind, filename: &str) -> Resource {
        Resource {
            asset: AssetId::new("asset-000001"),
            kind,
            filename: filename.to_string(),
        }
    }

    #[test]
    fn test_select_resource_preference() {
        let resources = vec![
            resource(ResourceKind::AdjustmentData, "edits.plist"),
            resource(ResourceKind::Photo, "IMG_1.JPG"),
            resource(ResourceKind::FullSizePhoto, "FullSizeRender.jpg"),
        ];
        assert_eq!(
            select_resource(&resources).map(|r| r.filename.as_str()),
            Some("FullSizeRender.jpg")
        );

        let resources = vec![
            resource(ResourceKind::Video, "clip.mov"),
            resource(ResourceKind::Photo, "still.heic"),
        ];
        assert_eq!(select_resource(&resources).map(|r| r.kind), Some(ResourceKind::Photo));

        let resources = vec![
            resource(ResourceKind::AlternatePhoto, "raw.dng"),
            resource(ResourceKind::AdjustmentData, "edits.plist"),
        ];
        assert!(select_resource(&resources).is_none());
    }

    #[test]
    fn test_status_from_progress() {
        let mut progress = Progress::new(3);
        progress.advance();
        progress.advance();
        let report = ExportReport {
            album: Album {
                id: crate::library::AlbumId::new("album-000001"),
                title: "Trip".into(),
                collection: None,
                asset_count: 3,
            },
            exported: 2,
            skipped: 1,
            failed: 0,
            deleted: Vec::new(),
            assets_deleted: true,
            progress,
        };
        assert_eq!(report.status(), ExportStatus::Partial { shortfall: 1 });
    }
}
