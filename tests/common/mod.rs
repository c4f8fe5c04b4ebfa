//! Shared fixtures for the migration tests
#![allow(dead_code)]

use photos_migrator::catalog::{FileCatalog, Folder, FolderCatalog};
use photos_migrator::error::{FileSystemError, LibraryError};
use photos_migrator::library::{
    Album, AlbumFilter, AlbumId, Asset, AssetId, AuthorizationStatus, BatchReceipt, Change, ChangeBatch,
    Collection, Resource,
};
use photos_migrator::store::StoreEntry;
use photos_migrator::{Config, FileStore, LocalFileStore, LocalLibrary, PhotoLibrary};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::SystemTime;
use tempfile::TempDir;

/// Albums root and library inside one temporary directory
pub struct Fixture {
    pub dir: TempDir,
    pub config: Config,
    pub store: LocalFileStore,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            albums_dir: dir.path().join("Albums"),
            library_dir: dir.path().join("Library"),
            log_dir: dir.path().join("Log"),
            ..Config::default()
        };
        fs::create_dir_all(&config.albums_dir).unwrap();
        Self {
            dir,
            config,
            store: LocalFileStore::new(),
        }
    }

    /// Library with access already granted
    pub fn library(&self) -> LocalLibrary {
        let mut library = LocalLibrary::open(&self.config.library_dir, &self.config).unwrap();
        library.request_authorization().unwrap();
        library
    }

    pub fn folders(&self) -> FolderCatalog<'_> {
        FolderCatalog::new(&self.store, &self.config.albums_dir)
    }

    /// Create album folder `name` holding `files`
    pub fn stage(&self, name: &str, files: &[(&str, &[u8])]) -> Folder {
        let path = self.config.albums_dir.join(name);
        fs::create_dir_all(&path).unwrap();
        for (file, data) in files {
            fs::write(path.join(file), data).unwrap();
        }
        self.folder(name)
    }

    /// Fresh listing of one album folder
    pub fn folder(&self, name: &str) -> Folder {
        self.folders().find(name).unwrap().unwrap()
    }

    pub fn file_names(&self, folder: &Folder) -> Vec<String> {
        FileCatalog::new(&self.store, &folder.path)
            .staged_files()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect()
    }
}

/// Sorted asset filenames of the top-level album titled `title`
pub fn album_assets(library: &dyn PhotoLibrary, title: &str) -> Option<Vec<String>> {
    let albums = library.find_albums(&AlbumFilter::TopLevel).unwrap();
    let album = albums.iter().find(|a| a.title == title)?;
    let mut names: Vec<String> = library
        .fetch_assets(&album.id)
        .unwrap()
        .into_iter()
        .map(|a| a.filename)
        .collect();
    names.sort();
    Some(names)
}

/// Library wrapper that rejects selected changes
pub struct FaultyLibrary<L> {
    pub inner: L,
    /// Asset creations from files with these names fail
    pub reject_files: HashSet<String>,
    pub reject_album_creation: bool,
    pub reject_deletes: bool,
    /// Every batch waits for a message (or disconnect) when set
    pub gate: Option<Receiver<()>>,
}

impl<L: PhotoLibrary> FaultyLibrary<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            reject_files: HashSet::new(),
            reject_album_creation: false,
            reject_deletes: false,
            gate: None,
        }
    }

    pub fn rejecting_files(mut self, names: &[&str]) -> Self {
        self.reject_files = names.iter().map(|n| n.to_string()).collect();
        self
    }

    fn rejects(&self, change: &Change) -> bool {
        match change {
            Change::CreateAsset { source } => source
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| self.reject_files.contains(n)),
            Change::CreateAlbum { .. } => self.reject_album_creation,
            Change::DeleteAssets { .. } => self.reject_deletes,
            _ => false,
        }
    }
}

impl<L: PhotoLibrary> PhotoLibrary for FaultyLibrary<L> {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.inner.authorization_status()
    }

    fn request_authorization(&mut self) -> Result<AuthorizationStatus, LibraryError> {
        self.inner.request_authorization()
    }

    fn find_albums(&self, filter: &AlbumFilter) -> Result<Vec<Album>, LibraryError> {
        self.inner.find_albums(filter)
    }

    fn find_collections(&self) -> Result<Vec<Collection>, LibraryError> {
        self.inner.find_collections()
    }

    fn fetch_assets(&self, album: &AlbumId) -> Result<Vec<Asset>, LibraryError> {
        self.inner.fetch_assets(album)
    }

    fn fetch_asset_resources(&self, asset: &AssetId) -> Result<Vec<Resource>, LibraryError> {
        self.inner.fetch_asset_resources(asset)
    }

    fn read_resource(&self, resource: &Resource) -> Result<Vec<u8>, LibraryError> {
        self.inner.read_resource(resource)
    }

    fn perform_changes(&mut self, batch: ChangeBatch) -> Result<BatchReceipt, LibraryError> {
        if let Some(gate) = &self.gate {
            let _ = gate.recv();
        }
        if batch.changes().iter().any(|c| self.rejects(c)) {
            return Err(LibraryError::batch("rejected by test"));
        }
        self.inner.perform_changes(batch)
    }
}

/// File store wrapper that fails selected operations
#[derive(Default)]
pub struct FaultyStore {
    pub inner: LocalFileStore,
    pub undeletable: HashSet<String>,
    pub unwritable: HashSet<String>,
}

impl FaultyStore {
    fn named(set: &HashSet<String>, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| set.contains(n))
    }
}

impl FileStore for FaultyStore {
    fn list_entries(&self, dir: &Path) -> Result<Vec<StoreEntry>, FileSystemError> {
        self.inner.list_entries(dir)
    }

    fn create_dir(&self, path: &Path) -> Result<(), FileSystemError> {
        self.inner.create_dir(path)
    }

    fn remove_entry(&self, path: &Path) -> Result<(), FileSystemError> {
        if Self::named(&self.undeletable, path) {
            return Err(FileSystemError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        self.inner.remove_entry(path)
    }

    fn write_bytes(&self, path: &Path, data: &[u8]) -> Result<(), FileSystemError> {
        if Self::named(&self.unwritable, path) {
            // Leave a truncated file behind like an interrupted write
            let _ = fs::write(path, &data[..data.len() / 2]);
            return Err(FileSystemError::Unknown {
                path: path.to_path_buf(),
                source: std::io::Error::other("device full"),
            });
        }
        self.inner.write_bytes(path, data)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.inner.file_exists(path)
    }

    fn set_modified(&self, path: &Path, time: SystemTime) -> Result<(), FileSystemError> {
        self.inner.set_modified(path, time)
    }
}

pub fn path_set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub fn blob_count(fixture: &Fixture) -> usize {
    fs::read_dir(fixture.config.library_dir.join("assets"))
        .map(|d| d.count())
        .unwrap_or(0)
}

pub fn read(path: PathBuf) -> Vec<u8> {
    fs::read(path).unwrap()
}
