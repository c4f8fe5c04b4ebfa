//! Nesting top-level albums inside collections

use crate::error::{LibraryError, LogicError, Result};
use crate::library::{Album, AlbumFilter, AlbumId, ChangeBatch, Collection, CollectionId, PhotoLibrary};
use crate::migrate::ensure_authorized;
use tracing::{info, warn};

/// All collections, sorted by title
pub fn list_collections(library: &dyn PhotoLibrary) -> Result<Vec<Collection>> {
    let mut collections = library.find_collections()?;
    collections.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(collections)
}

/// Create an empty collection titled `title`
pub fn create_collection(library: &mut dyn PhotoLibrary, title: &str) -> Result<Collection> {
    let title = title.trim();
    if title.is_empty() {
        return Err(LogicError::BlankTitle.into());
    }
    ensure_authorized(library)?;

    let mut batch = ChangeBatch::new();
    let placeholder = batch.create_collection(title);
    let receipt = library.perform_changes(batch)?;
    let id = receipt
        .collection(placeholder)
        .ok_or_else(|| LibraryError::Unknown(format!("Collection {title:?} was not created")))?;

    info!(collection = %title, %id, "Created collection");
    Ok(Collection {
        id,
        title: title.to_string(),
        album_count: 0,
    })
}

/// Albums nested in `collection`, sorted by title
pub fn collection_albums(library: &dyn PhotoLibrary, collection: &CollectionId) -> Result<Vec<Album>> {
    sorted_albums(library, &AlbumFilter::InCollection(collection.clone()))
}

/// Albums that can still be moved into a collection
pub fn movable_albums(library: &dyn PhotoLibrary) -> Result<Vec<Album>> {
    sorted_albums(library, &AlbumFilter::TopLevel)
}

/// Insert `albums` into `collection` in one batch; returns how many moved
pub fn move_albums(
    library: &mut dyn PhotoLibrary,
    collection: &CollectionId,
    albums: &[AlbumId],
) -> Result<usize> {
    if albums.is_empty() {
        return Ok(0);
    }
    ensure_authorized(library)?;

    let mut batch = ChangeBatch::new();
    batch.insert_albums(collection, albums.iter().cloned());
    library.perform_changes(batch).inspect_err(|e| {
        warn!(%collection, count = albums.len(), error = %e, "Failed to move albums");
    })?;

    info!(%collection, count = albums.len(), "Moved albums into collection");
    Ok(albums.len())
}

fn sorted_albums(library: &dyn PhotoLibrary, filter: &AlbumFilter) -> Result<Vec<Album>> {
    let mut albums = library.find_albums(filter)?;
    albums.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(albums)
}
