//! Change batches
//!
//! Creation requests hand back a [`Placeholder`] so later changes in the
//! same batch can refer to the object before it has an identifier. The
//! [`BatchReceipt`] resolves placeholders once the batch is applied.

use super::{AlbumId, AssetId, CollectionId};
use std::collections::HashMap;
use std::path::PathBuf;

/// Refers to an object created earlier in the same batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placeholder(usize);

impl Placeholder {
    /// Position of the creating change within its batch
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An asset that either exists or is created by the same batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    Existing(AssetId),
    Pending(Placeholder),
}

impl From<AssetId> for AssetRef {
    fn from(id: AssetId) -> Self {
        AssetRef::Existing(id)
    }
}

impl From<Placeholder> for AssetRef {
    fn from(placeholder: Placeholder) -> Self {
        AssetRef::Pending(placeholder)
    }
}

/// A single queued mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    CreateAlbum { title: String },
    CreateCollection { title: String },
    CreateAsset { source: PathBuf },
    AddAssets { album: AlbumId, assets: Vec<AssetRef> },
    DeleteAssets { assets: Vec<AssetId> },
    InsertAlbums { collection: CollectionId, albums: Vec<AlbumId> },
}

/// Mutations submitted to the library together
#[derive(Debug, Clone, Default)]
pub struct ChangeBatch {
    changes: Vec<Change>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_creation(&mut self, change: Change) -> Placeholder {
        let placeholder = Placeholder(self.changes.len());
        self.changes.push(change);
        placeholder
    }

    pub fn create_album(&mut self, title: impl Into<String>) -> Placeholder {
        self.push_creation(Change::CreateAlbum {
            title: title.into(),
        })
    }

    pub fn create_collection(&mut self, title: impl Into<String>) -> Placeholder {
        self.push_creation(Change::CreateCollection {
            title: title.into(),
        })
    }

    /// Create an asset whose content is read from `source`
    pub fn create_asset_from_file(&mut self, source: impl Into<PathBuf>) -> Placeholder {
        self.push_creation(Change::CreateAsset {
            source: source.into(),
        })
    }

    pub fn add_assets_to_album<I, A>(&mut self, album: &AlbumId, assets: I)
    where
        I: IntoIterator<Item = A>,
        A: Into<AssetRef>,
    {
        self.changes.push(Change::AddAssets {
            album: album.clone(),
            assets: assets.into_iter().map(Into::into).collect(),
        });
    }

    pub fn delete_assets(&mut self, assets: impl IntoIterator<Item = AssetId>) {
        self.changes.push(Change::DeleteAssets {
            assets: assets.into_iter().collect(),
        });
    }

    /// Nest `albums` inside `collection`
    pub fn insert_albums(
        &mut self,
        collection: &CollectionId,
        albums: impl IntoIterator<Item = AlbumId>,
    ) {
        self.changes.push(Change::InsertAlbums {
            collection: collection.clone(),
            albums: albums.into_iter().collect(),
        });
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Identifiers assigned to the objects a batch created
#[derive(Debug, Clone, Default)]
pub struct BatchReceipt {
    created: HashMap<usize, String>,
}

impl BatchReceipt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, placeholder: Placeholder, id: impl Into<String>) {
        self.created.insert(placeholder.0, id.into());
    }

    /// Record the identifier created by the change at `index`
    pub fn record_at(&mut self, index: usize, id: impl Into<String>) {
        self.record(Placeholder(index), id);
    }

    pub fn album(&self, placeholder: Placeholder) -> Option<AlbumId> {
        self.created.get(&placeholder.0).map(AlbumId::new)
    }

    pub fn asset(&self, placeholder: Placeholder) -> Option<AssetId> {
        self.created.get(&placeholder.0).map(AssetId::new)
    }

    pub fn collection(&self, placeholder: Placeholder) -> Option<CollectionId> {
        self.created.get(&placeholder.0).map(CollectionId::new)
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}
