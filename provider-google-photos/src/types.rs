//! Google Photos API response types
//!
//! Data structures for deserializing Google Photos Library API v1 responses.

use serde::{Deserialize, Serialize};

/// Google Photos API media item resource
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/mediaItems
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleMediaItem {
    /// Media item ID
    pub id: String,

    /// Original filename
    pub filename: String,

    /// MIME type
    pub mime_type: String,

    /// Short-lived content locator; stays valid for roughly an hour
    pub base_url: Option<String>,

    /// Media-specific metadata
    pub media_metadata: Option<MediaMetadata>,
}

/// Media item metadata block
///
/// Width and height come over the wire as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    /// Creation time (RFC 3339)
    pub creation_time: Option<String>,

    /// Width in pixels
    pub width: Option<String>,

    /// Height in pixels
    pub height: Option<String>,
}

/// Google Photos API album resource
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/albums
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAlbum {
    /// Album ID
    pub id: String,

    /// Album title
    pub title: Option<String>,

    /// Link to the album in the Google Photos UI
    pub product_url: Option<String>,

    /// Number of media items, as a decimal string
    pub media_items_count: Option<String>,
}

/// Google Photos API albums.list response
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/albums/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumsListResponse {
    /// List of albums; absent when the account has none
    #[serde(default)]
    pub albums: Vec<GoogleAlbum>,

    /// Token for next page
    pub next_page_token: Option<String>,
}

/// Google Photos API mediaItems.list / mediaItems.search response
///
/// Both endpoints share the same response shape.
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/mediaItems/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemsResponse {
    /// Page of media items; absent when the listing is empty
    #[serde(default)]
    pub media_items: Vec<GoogleMediaItem>,

    /// Token for next page
    pub next_page_token: Option<String>,
}

/// Google Photos API mediaItems.search request body
///
/// See: https://developers.google.com/photos/library/reference/rest/v1/mediaItems/search
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMediaItemsRequest {
    /// Album to scope the search to
    pub album_id: String,

    /// Requested page size
    pub page_size: u32,

    /// Continuation token from the previous page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}
