//! On-disk photo library
//!
//! Layout under the library root:
//! - `library.json` - catalog of albums, collections and assets
//! - `assets/` - one blob per asset resource
//!
//! The catalog is rewritten through a temporary file and a rename, so a
//! batch is either fully recorded or not at all.

use super::batch::{AssetRef, BatchReceipt, Change, ChangeBatch, Placeholder};
use super::capture::capture_date;
use super::{
    Album, AlbumFilter, AlbumId, Asset, AssetId, AuthorizationStatus, Collection, CollectionId,
    PhotoLibrary, Resource, ResourceKind,
};
use crate::config::Config;
use crate::error::{Error, LibraryError, Result};
use crate::hash;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CATALOG_FILE: &str = "library.json";
const ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AlbumRecord {
    id: AlbumId,
    title: String,
    collection: Option<CollectionId>,
    assets: Vec<AssetId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionRecord {
    id: CollectionId,
    title: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResourceRecord {
    kind: ResourceKind,
    filename: String,
    /// Blob path relative to the library root
    blob: PathBuf,
    content_hash: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssetRecord {
    id: AssetId,
    filename: String,
    created_at: NaiveDateTime,
    imported_at: DateTime<Utc>,
    resources: Vec<ResourceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Catalog {
    version: u32,
    next_id: u64,
    authorization: AuthorizationStatus,
    albums: Vec<AlbumRecord>,
    collections: Vec<CollectionRecord>,
    assets: Vec<AssetRecord>,
    updated_at: Option<DateTime<Utc>>,
}

impl Catalog {
    const VERSION: u32 = 1;

    fn new() -> Self {
        Self {
            version: Self::VERSION,
            next_id: 1,
            authorization: AuthorizationStatus::NotDetermined,
            albums: Vec::new(),
            collections: Vec::new(),
            assets: Vec::new(),
            updated_at: None,
        }
    }

    fn allocate_id(&mut self, prefix: &str) -> String {
        let id = format!("{}-{:06}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    fn album_mut(&mut self, id: &AlbumId) -> std::result::Result<&mut AlbumRecord, LibraryError> {
        self.albums
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| LibraryError::NotFound {
                entity: "album",
                id: id.to_string(),
            })
    }

    fn asset(&self, id: &AssetId) -> std::result::Result<&AssetRecord, LibraryError> {
        self.assets
            .iter()
            .find(|a| &a.id == id)
            .ok_or_else(|| LibraryError::NotFound {
                entity: "asset",
                id: id.to_string(),
            })
    }
}

/// Photo library stored in a directory
pub struct LocalLibrary {
    root: PathBuf,
    catalog: Catalog,
    config: Config,
}

/// Side effects of a batch that are only finalised once the catalog is saved
#[derive(Default)]
struct StagedBlobs {
    written: Vec<PathBuf>,
    doomed: Vec<PathBuf>,
}

impl LocalLibrary {
    /// Open the library at `root`, creating an empty one if needed
    pub fn open(root: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(ASSETS_DIR))?;

        let catalog_path = root.join(CATALOG_FILE);
        let catalog = if catalog_path.exists() {
            let reader = BufReader::new(File::open(&catalog_path)?);
            let catalog: Catalog = serde_json::from_reader(reader)?;
            if catalog.version != Catalog::VERSION {
                return Err(Error::Config(format!(
                    "Unsupported library version {} in {}",
                    catalog.version,
                    catalog_path.display()
                )));
            }
            info!(
                library = %root.display(),
                albums = catalog.albums.len(),
                assets = catalog.assets.len(),
                "Opened photo library"
            );
            catalog
        } else {
            info!(library = %root.display(), "Creating new photo library");
            Catalog::new()
        };

        let mut config = config.clone();
        for extension in &mut config.image_extensions {
            *extension = extension.to_lowercase();
        }

        Ok(Self {
            root,
            catalog,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Grant or revoke access explicitly
    pub fn set_authorization(&mut self, status: AuthorizationStatus) -> Result<()> {
        let mut catalog = self.catalog.clone();
        catalog.authorization = status;
        self.write_catalog(&mut catalog)?;
        self.catalog = catalog;
        info!(?status, "Library authorization changed");
        Ok(())
    }

    fn ensure_authorized(&self) -> std::result::Result<(), LibraryError> {
        if self.catalog.authorization == AuthorizationStatus::Authorized {
            Ok(())
        } else {
            Err(LibraryError::AuthorizationDenied)
        }
    }

    fn write_catalog(&self, catalog: &mut Catalog) -> std::result::Result<(), LibraryError> {
        catalog.updated_at = Some(Utc::now());

        let path = self.root.join(CATALOG_FILE);
        let temp_path = path.with_extension("tmp");
        let store = || -> std::io::Result<()> {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &*catalog)?;
            writer.flush()?;
            fs::rename(&temp_path, &path)
        };

        store().map_err(|e| LibraryError::batch(format!("Failed to save catalog: {}", e)))
    }

    fn apply(
        &self,
        catalog: &mut Catalog,
        index: usize,
        change: Change,
        receipt: &mut BatchReceipt,
        blobs: &mut StagedBlobs,
    ) -> std::result::Result<(), LibraryError> {
        match change {
            Change::CreateAlbum { title } => {
                let id = catalog.allocate_id("album");
                catalog.albums.push(AlbumRecord {
                    id: AlbumId::new(id.clone()),
                    title,
                    collection: None,
                    assets: Vec::new(),
                });
                receipt.record_at(index, id);
            }
            Change::CreateCollection { title } => {
                let id = catalog.allocate_id("collection");
                catalog.collections.push(CollectionRecord {
                    id: CollectionId::new(id.clone()),
                    title,
                    created_at: Utc::now(),
                });
                receipt.record_at(index, id);
            }
            Change::CreateAsset { source } => {
                let record = self.import_blob(catalog, &source, blobs)?;
                receipt.record_at(index, record.id.as_str());
                catalog.assets.push(record);
            }
            Change::AddAssets { album, assets } => {
                let mut resolved = Vec::with_capacity(assets.len());
                for asset in assets {
                    let id = match asset {
                        AssetRef::Existing(id) => id,
                        AssetRef::Pending(placeholder) => resolve_pending(receipt, placeholder)?,
                    };
                    catalog.asset(&id)?;
                    resolved.push(id);
                }

                let record = catalog.album_mut(&album)?;
                for id in resolved {
                    if !record.assets.contains(&id) {
                        record.assets.push(id);
                    }
                }
            }
            Change::DeleteAssets { assets } => {
                for id in assets {
                    let position = catalog
                        .assets
                        .iter()
                        .position(|a| a.id == id)
                        .ok_or_else(|| LibraryError::NotFound {
                            entity: "asset",
                            id: id.to_string(),
                        })?;
                    let removed = catalog.assets.remove(position);
                    for album in &mut catalog.albums {
                        album.assets.retain(|a| a != &id);
                    }
                    blobs
                        .doomed
                        .extend(removed.resources.into_iter().map(|r| self.root.join(r.blob)));
                }
            }
            Change::InsertAlbums { collection, albums } => {
                if !catalog.collections.iter().any(|c| c.id == collection) {
                    return Err(LibraryError::NotFound {
                        entity: "collection",
                        id: collection.to_string(),
                    });
                }
                for album in albums {
                    catalog.album_mut(&album)?.collection = Some(collection.clone());
                }
            }
        }
        Ok(())
    }

    fn import_blob(
        &self,
        catalog: &mut Catalog,
        source: &Path,
        blobs: &mut StagedBlobs,
    ) -> std::result::Result<AssetRecord, LibraryError> {
        if !self.config.is_image_path(source) {
            return Err(LibraryError::batch(format!(
                "Unsupported photo type: {}",
                source.display()
            )));
        }
        let filename = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| LibraryError::batch(format!("Invalid file name: {}", source.display())))?
            .to_string();

        let data = fs::read(source).map_err(|e| {
            LibraryError::batch(format!("Failed to read {}: {}", source.display(), e))
        })?;
        if data.is_empty() {
            return Err(LibraryError::batch(format!("Empty photo: {}", source.display())));
        }

        let (created_at, capture_source) = capture_date(source);
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin")
            .to_lowercase();

        // Blobs left by an interrupted batch are not in the catalog; skip their ids
        let (id, blob, mut file) = loop {
            let id = catalog.allocate_id("asset");
            let blob = Path::new(ASSETS_DIR).join(format!("{}.{}", id, extension));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.root.join(&blob))
            {
                Ok(file) => break (id, blob, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    warn!(blob = %blob.display(), "Skipping orphaned asset blob");
                }
                Err(e) => {
                    return Err(LibraryError::batch(format!(
                        "Failed to store {}: {}",
                        filename, e
                    )));
                }
            }
        };
        blobs.written.push(self.root.join(&blob));
        file.write_all(&data)
            .map_err(|e| LibraryError::batch(format!("Failed to store {}: {}", filename, e)))?;

        debug!(asset = %id, file = %filename, ?capture_source, "Staged asset payload");

        Ok(AssetRecord {
            id: AssetId::new(id),
            filename: filename.clone(),
            created_at,
            imported_at: Utc::now(),
            resources: vec![ResourceRecord {
                kind: ResourceKind::Photo,
                filename,
                blob,
                content_hash: hash::content_hash(&data),
            }],
        })
    }
}

fn resolve_pending(
    receipt: &BatchReceipt,
    placeholder: Placeholder,
) -> std::result::Result<AssetId, LibraryError> {
    receipt.asset(placeholder).ok_or_else(|| {
        LibraryError::batch(format!(
            "Placeholder {} does not refer to an earlier asset",
            placeholder.index()
        ))
    })
}

fn remove_blobs(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!(blob = %path.display(), error = %e, "Failed to remove asset blob");
        }
    }
}

impl PhotoLibrary for LocalLibrary {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.catalog.authorization
    }

    fn request_authorization(&mut self) -> std::result::Result<AuthorizationStatus, LibraryError> {
        if self.catalog.authorization == AuthorizationStatus::NotDetermined {
            let mut catalog = self.catalog.clone();
            catalog.authorization = AuthorizationStatus::Authorized;
            self.write_catalog(&mut catalog)?;
            self.catalog = catalog;
            info!("Library access granted");
        }
        Ok(self.catalog.authorization)
    }

    fn find_albums(&self, filter: &AlbumFilter) -> std::result::Result<Vec<Album>, LibraryError> {
        self.ensure_authorized()?;
        Ok(self
            .catalog
            .albums
            .iter()
            .filter(|a| match filter {
                AlbumFilter::All => true,
                AlbumFilter::TopLevel => a.collection.is_none(),
                AlbumFilter::InCollection(id) => a.collection.as_ref() == Some(id),
            })
            .map(|a| Album {
                id: a.id.clone(),
                title: a.title.clone(),
                collection: a.collection.clone(),
                asset_count: a.assets.len(),
            })
            .collect())
    }

    fn find_collections(&self) -> std::result::Result<Vec<Collection>, LibraryError> {
        self.ensure_authorized()?;
        Ok(self
            .catalog
            .collections
            .iter()
            .map(|c| Collection {
                id: c.id.clone(),
                title: c.title.clone(),
                album_count: self
                    .catalog
                    .albums
                    .iter()
                    .filter(|a| a.collection.as_ref() == Some(&c.id))
                    .count(),
            })
            .collect())
    }

    fn fetch_assets(&self, album: &AlbumId) -> std::result::Result<Vec<Asset>, LibraryError> {
        self.ensure_authorized()?;
        let record = self
            .catalog
            .albums
            .iter()
            .find(|a| &a.id == album)
            .ok_or_else(|| LibraryError::NotFound {
                entity: "album",
                id: album.to_string(),
            })?;

        record
            .assets
            .iter()
            .map(|id| {
                let asset = self.catalog.asset(id)?;
                Ok(Asset {
                    id: asset.id.clone(),
                    filename: asset.filename.clone(),
                    created_at: asset.created_at,
                })
            })
            .collect()
    }

    fn fetch_asset_resources(
        &self,
        asset: &AssetId,
    ) -> std::result::Result<Vec<Resource>, LibraryError> {
        self.ensure_authorized()?;
        let record = self.catalog.asset(asset)?;
        Ok(record
            .resources
            .iter()
            .map(|r| Resource {
                asset: asset.clone(),
                kind: r.kind,
                filename: r.filename.clone(),
            })
            .collect())
    }

    fn read_resource(&self, resource: &Resource) -> std::result::Result<Vec<u8>, LibraryError> {
        self.ensure_authorized()?;
        let fetch_failed = |message: String| LibraryError::ResourceFetchFailed {
            filename: resource.filename.clone(),
            message,
        };

        let record = self.catalog.asset(&resource.asset)?;
        let stored = record
            .resources
            .iter()
            .find(|r| r.kind == resource.kind && r.filename == resource.filename)
            .ok_or_else(|| fetch_failed("resource no longer exists".into()))?;

        let data = fs::read(self.root.join(&stored.blob)).map_err(|e| fetch_failed(e.to_string()))?;
        if !hash::verify(&data, stored.content_hash) {
            return Err(fetch_failed("stored payload is corrupted".into()));
        }
        Ok(data)
    }

    fn perform_changes(
        &mut self,
        batch: ChangeBatch,
    ) -> std::result::Result<BatchReceipt, LibraryError> {
        self.ensure_authorized()?;

        let change_count = batch.len();
        let mut catalog = self.catalog.clone();
        let mut receipt = BatchReceipt::new();
        let mut blobs = StagedBlobs::default();

        for (index, change) in batch.into_changes().into_iter().enumerate() {
            if let Err(e) = self.apply(&mut catalog, index, change, &mut receipt, &mut blobs) {
                warn!(index, error = %e, "Library change rejected, discarding batch");
                remove_blobs(&blobs.written);
                return Err(e);
            }
        }

        if let Err(e) = self.write_catalog(&mut catalog) {
            remove_blobs(&blobs.written);
            return Err(e);
        }
        self.catalog = catalog;
        remove_blobs(&blobs.doomed);

        debug!(changes = change_count, created = receipt.len(), "Applied library batch");
        Ok(receipt)
    }
}
