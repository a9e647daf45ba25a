//! Destination Provider Capability
//!
//! The write side of a transfer: album lookup and creation, uploads, and
//! album membership.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::media::{RemoteAlbum, RemotePhoto, UploadMetadata, UploadOutcome};

/// A cloud photo service the engine writes to
///
/// Implementations wrap one vendor's upload and album API. Per-item upload
/// failures are reported through [`UploadOutcome`], not `Err`; `Err` is
/// reserved for failures outside a single upload conversation, such as a
/// listing call that cannot produce a page.
///
/// # Example
///
/// ```ignore
/// use transfer_traits::destination::MediaDestination;
///
/// async fn ensure_album(dest: &dyn MediaDestination, title: &str) -> Result<String> {
///     if let Some(album) = dest.get_album_by_name(title).await? {
///         return Ok(album.id);
///     }
///     let created = dest.create_album(title, None).await?;
///     Ok(created.id)
/// }
/// ```
#[async_trait]
pub trait MediaDestination: Send + Sync {
    /// Look up an album by name
    ///
    /// Returns `Ok(None)` when no album carries that name.
    async fn get_album_by_name(&self, name: &str) -> Result<Option<RemoteAlbum>>;

    /// Create an album, optionally with a description
    async fn create_album(&self, name: &str, description: Option<&str>) -> Result<RemoteAlbum>;

    /// List photos, scoped to one album when `album_id` is given
    async fn list_photos(&self, album_id: Option<&str>) -> Result<Vec<RemotePhoto>>;

    /// Upload one staged file, with optional source-side metadata
    ///
    /// A vendor rejection (quota, name conflict, bad content) comes back as
    /// a failed outcome so the caller can count it and move on.
    async fn upload_photo(
        &self,
        path: &Path,
        metadata: Option<&UploadMetadata>,
    ) -> Result<UploadOutcome>;

    /// Ensure a photo is a member of an album
    ///
    /// `Ok(true)` when the photo is in the album afterwards, including when
    /// it already was; `Ok(false)` when the service declined.
    async fn add_photo_to_album(&self, photo_id: &str, album_id: &str) -> Result<bool>;
}
