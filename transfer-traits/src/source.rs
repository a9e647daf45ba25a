//! Source Provider Capability
//!
//! The read side of a transfer: listing albums and media, and staging item
//! content on local disk for upload.

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::media::{Album, MediaItem, StagedMedia};

/// A cloud photo service the engine reads from
///
/// Implementations wrap one vendor's listing and download API behind a
/// vendor-neutral surface. The engine drives pagination itself through
/// [`list_media_items`](MediaSource::list_media_items); everything else is
/// a single call.
///
/// # Example
///
/// ```ignore
/// use transfer_traits::source::MediaSource;
///
/// async fn first_page(source: &dyn MediaSource) -> Result<()> {
///     let (items, next) = source.list_media_items(50, None, None).await?;
///     println!("{} items, more: {}", items.len(), next.is_some());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// List every album in the account
    ///
    /// Implementations walk the vendor's pagination internally; no
    /// continuation cursor escapes this call.
    async fn list_albums(&self) -> Result<Vec<Album>>;

    /// Fetch one album by its source identifier
    async fn get_album_details(&self, album_id: &str) -> Result<Album>;

    /// List one page of media items
    ///
    /// When `album_id` is given, the listing is scoped to that album.
    /// Returns the page together with the cursor for the next one, or
    /// `None` when this was the last page. Download locators on the
    /// returned items are only valid until the next page is fetched.
    async fn list_media_items(
        &self,
        page_size: u32,
        page_token: Option<String>,
        album_id: Option<&str>,
    ) -> Result<(Vec<MediaItem>, Option<String>)>;

    /// Download one item into `staging_dir`, named after its filename
    ///
    /// On error, any partially written staging file has already been
    /// removed when this returns.
    async fn download_media_item(
        &self,
        item: &MediaItem,
        staging_dir: &Path,
    ) -> Result<StagedMedia>;
}
