//! Matching a folder to a library album by title

use crate::error::{Error, LogicError};
use crate::library::{Album, AlbumFilter, AlbumId, ChangeBatch, PhotoLibrary};
use tracing::{info, warn};

/// First top-level album whose title equals `title` exactly
pub fn resolve<'a>(title: &str, albums: &'a [Album]) -> Option<&'a Album> {
    albums.iter().find(|album| album.title == title)
}

/// Look the album up in the library
pub fn find_album(library: &dyn PhotoLibrary, title: &str) -> Result<Option<Album>, Error> {
    let albums = library.find_albums(&AlbumFilter::TopLevel).map_err(|e| {
        warn!(album = %title, error = %e, "Album lookup failed");
        LogicError::AlbumResolutionFailed {
            title: title.to_string(),
        }
    })?;
    Ok(resolve(title, &albums).cloned())
}

/// Album an import writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlbum {
    pub id: AlbumId,
    /// The album did not exist and was created for this import
    pub created: bool,
}

/// Find the album titled `title`, creating it if there is none
pub fn resolve_or_create(library: &mut dyn PhotoLibrary, title: &str) -> Result<ResolvedAlbum, Error> {
    if let Some(album) = find_album(library, title)? {
        info!(album = %title, id = %album.id, "Using existing album");
        return Ok(ResolvedAlbum {
            id: album.id,
            created: false,
        });
    }

    let mut batch = ChangeBatch::new();
    let placeholder = batch.create_album(title);
    let receipt = library
        .perform_changes(batch)
        .map_err(|source| LogicError::AlbumCreationFailed {
            title: title.to_string(),
            source,
        })?;

    // The new album must be visible before anything is moved into it
    let created = receipt
        .album(placeholder)
        .and_then(|id| find_album(library, title).ok().flatten().filter(|a| a.id == id))
        .ok_or_else(|| LogicError::AlbumResolutionFailed {
            title: title.to_string(),
        })?;

    info!(album = %title, id = %created.id, "Created album");
    Ok(ResolvedAlbum {
        id: created.id,
        created: true,
    })
}
