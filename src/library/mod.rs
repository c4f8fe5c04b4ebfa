//! Photo library interface
//!
//! The library owns albums, collections of albums and assets. Everything
//! that mutates it goes through a [`ChangeBatch`], which the library
//! applies as a whole or not at all.

pub mod batch;
pub mod capture;
pub mod local;

pub use batch::{AssetRef, BatchReceipt, Change, ChangeBatch, Placeholder};
pub use local::LocalLibrary;

use crate::error::LibraryError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! local_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

local_identifier!(
    /// Stable identifier of a library album
    AlbumId
);
local_identifier!(
    /// Stable identifier of a library asset
    AssetId
);
local_identifier!(
    /// Stable identifier of a collection of albums
    CollectionId
);

/// Whether this process may use the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Authorized,
    Denied,
}

/// A user album
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    /// Collection the album is nested in, `None` for top-level albums
    pub collection: Option<CollectionId>,
    pub asset_count: usize,
}

/// An album of albums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: CollectionId,
    pub title: String,
    pub album_count: usize,
}

/// A photo owned by the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: AssetId,
    pub filename: String,
    pub created_at: NaiveDateTime,
}

/// Kind of byte representation backing an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Photo,
    FullSizePhoto,
    Video,
    FullSizeVideo,
    AlternatePhoto,
    AdjustmentData,
}

/// One representation of an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub asset: AssetId,
    pub kind: ResourceKind,
    pub filename: String,
}

/// Which albums a fetch should return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumFilter {
    All,
    /// Albums not nested in any collection
    TopLevel,
    InCollection(CollectionId),
}

/// Operations the migration pipelines need from a photo library
pub trait PhotoLibrary: Send {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask for access; returns the resulting status
    fn request_authorization(&mut self) -> Result<AuthorizationStatus, LibraryError>;

    /// Albums matching `filter`, in the library's own order
    fn find_albums(&self, filter: &AlbumFilter) -> Result<Vec<Album>, LibraryError>;

    fn find_collections(&self) -> Result<Vec<Collection>, LibraryError>;

    fn fetch_assets(&self, album: &AlbumId) -> Result<Vec<Asset>, LibraryError>;

    fn fetch_asset_resources(&self, asset: &AssetId) -> Result<Vec<Resource>, LibraryError>;

    /// Bytes of one resource
    fn read_resource(&self, resource: &Resource) -> Result<Vec<u8>, LibraryError>;

    /// Apply every change of `batch` atomically
    fn perform_changes(&mut self, batch: ChangeBatch) -> Result<BatchReceipt, LibraryError>;
}

impl<L: PhotoLibrary + ?Sized> PhotoLibrary for Box<L> {
    fn authorization_status(&self) -> AuthorizationStatus {
        (**self).authorization_status()
    }

    fn request_authorization(&mut self) -> Result<AuthorizationStatus, LibraryError> {
        (**self).request_authorization()
    }

    fn find_albums(&self, filter: &AlbumFilter) -> Result<Vec<Album>, LibraryError> {
        (**self).find_albums(filter)
    }

    fn find_collections(&self) -> Result<Vec<Collection>, LibraryError> {
        (**self).find_collections()
    }

    fn fetch_assets(&self, album: &AlbumId) -> Result<Vec<Asset>, LibraryError> {
        (**self).fetch_assets(album)
    }

    fn fetch_asset_resources(&self, asset: &AssetId) -> Result<Vec<Resource>, LibraryError> {
        (**self).fetch_asset_resources(asset)
    }

    fn read_resource(&self, resource: &Resource) -> Result<Vec<u8>, LibraryError> {
        (**self).read_resource(resource)
    }

    fn perform_changes(&mut self, batch: ChangeBatch) -> Result<BatchReceipt, LibraryError> {
        (**self).perform_changes(batch)
    }
}
