//! Google Photos API connector implementation
//!
//! Implements the `MediaSource` trait for the Google Photos Library API v1.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use transfer_traits::error::Result;
use transfer_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use transfer_traits::media::{Album, MediaItem, MediaKind, StagedMedia};
use transfer_traits::source::MediaSource;

use crate::error::GooglePhotosError;
use crate::types::{AlbumsListResponse, GoogleAlbum, GoogleMediaItem, MediaItemsResponse, SearchMediaItemsRequest};

/// Google Photos Library API base URL
const PHOTOS_API_BASE: &str = "https://photoslibrary.googleapis.com/v1";

/// Page size used when walking the album listing
const ALBUM_PAGE_SIZE: u32 = 50;

/// Google Photos API connector
///
/// Implements `MediaSource` for the Google Photos Library API v1.
///
/// # Features
///
/// - Paginated media listing, both library-wide and scoped to an album
/// - Album listing and lookup
/// - Streaming downloads of original photo and video bytes
/// - Exponential backoff for rate limiting
/// - OAuth 2.0 bearer authentication via `HttpClient`
///
/// # Example
///
/// ```ignore
/// use provider_google_photos::GooglePhotosConnector;
/// use transfer_traits::source::MediaSource;
///
/// let connector = GooglePhotosConnector::new(http_client, access_token);
/// let albums = connector.list_albums().await?;
/// ```
pub struct GooglePhotosConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token
    access_token: String,
}

impl GooglePhotosConnector {
    /// Create a new Google Photos connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `access_token` - OAuth 2.0 access token with `photoslibrary.readonly` scope
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: String) -> Self {
        Self {
            http_client,
            access_token,
        }
    }

    /// Build authorization header value
    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Build an authenticated GET request
    fn get_request(&self, url: String) -> HttpRequest {
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), self.auth_header());
        headers.insert("Accept".to_string(), "application/json".to_string());

        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers,
            body: None,
            timeout: Some(std::time::Duration::from_secs(30)),
        }
    }

    /// Parse RFC 3339 timestamp
    fn parse_timestamp(rfc3339: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(rfc3339)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Convert GoogleMediaItem to MediaItem
    fn convert_media_item(&self, item: GoogleMediaItem) -> MediaItem {
        let kind = MediaKind::from_mime(&item.mime_type);
        let metadata = item.media_metadata.unwrap_or_default();

        MediaItem {
            id: item.id,
            filename: item.filename,
            kind,
            mime_type: Some(item.mime_type),
            size_bytes: None,
            creation_time: metadata
                .creation_time
                .as_deref()
                .and_then(Self::parse_timestamp),
            width: metadata.width.as_deref().and_then(|w| w.parse().ok()),
            height: metadata.height.as_deref().and_then(|h| h.parse().ok()),
            download_url: item.base_url,
        }
    }

    /// Convert GoogleAlbum to Album
    ///
    /// The album's product URL rides along as the description so the
    /// destination copy can point back at the original.
    fn convert_album(&self, album: GoogleAlbum) -> Album {
        Album {
            id: album.id,
            title: album.title.unwrap_or_default(),
            description: album.product_url,
            item_count: album
                .media_items_count
                .as_deref()
                .and_then(|c| c.parse().ok()),
        }
    }

    /// Execute API request with retry logic
    ///
    /// Implements exponential backoff for rate limiting and transient errors.
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        max_retries: u32,
    ) -> Result<HttpResponse> {
        let mut attempt = 0;

        loop {
            match self.http_client.execute(request.clone()).await {
                Ok(response) => {
                    let status = response.status;

                    if status == 200 {
                        debug!("API request succeeded: status={}", status);
                        return Ok(response);
                    } else if status == 429 || (status >= 500 && status < 600) {
                        // Rate limit or server error - retry with backoff
                        attempt += 1;
                        if attempt >= max_retries {
                            warn!(
                                "API request failed after {} attempts: status={}",
                                max_retries, status
                            );
                            return Err(GooglePhotosError::ApiError {
                                status_code: status,
                                message: format!("Request failed after {} retries", max_retries),
                            }
                            .into());
                        }

                        let backoff_ms = 100u64 * 2u64.pow(attempt);
                        warn!(
                            "API request failed (attempt {}/{}): status={}, retrying in {}ms",
                            attempt, max_retries, status, backoff_ms
                        );
                        tokio::time::sleep(tokio::time::Duration::from_millis(backoff_ms)).await;
                    } else {
                        // Client error - don't retry
                        warn!("API request failed: status={}", status);
                        return Err(GooglePhotosError::ApiError {
                            status_code: status,
                            message: String::from_utf8_lossy(&response.body).to_string(),
                        }
                        .into());
                    }
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        warn!("API request failed after {} attempts: {}", max_retries, e);
                        return Err(e);
                    }

                    let backoff_ms = 100u64 * 2u64.pow(attempt);
                    warn!(
                        "API request failed (attempt {}/{}): {}, retrying in {}ms",
                        attempt, max_retries, e, backoff_ms
                    );
                    tokio::time::sleep(tokio::time::Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl MediaSource for GooglePhotosConnector {
    #[instrument(skip(self))]
    async fn list_albums(&self) -> Result<Vec<Album>> {
        info!("Listing albums from Google Photos");

        let mut albums = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/albums?pageSize={}", PHOTOS_API_BASE, ALBUM_PAGE_SIZE);
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self.execute_with_retry(self.get_request(url), 3).await?;

            let list_response: AlbumsListResponse = serde_json::from_slice(&response.body)
                .map_err(|e| {
                    GooglePhotosError::ParseError(format!(
                        "Failed to parse albums list response: {}",
                        e
                    ))
                })?;

            albums.extend(
                list_response
                    .albums
                    .into_iter()
                    .map(|a| self.convert_album(a)),
            );

            page_token = list_response.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        info!("Listed {} albums from Google Photos", albums.len());

        Ok(albums)
    }

    #[instrument(skip(self), fields(album_id = %album_id))]
    async fn get_album_details(&self, album_id: &str) -> Result<Album> {
        let url = format!("{}/albums/{}", PHOTOS_API_BASE, album_id);

        let response = self.execute_with_retry(self.get_request(url), 3).await?;

        let album: GoogleAlbum = serde_json::from_slice(&response.body).map_err(|e| {
            GooglePhotosError::ParseError(format!("Failed to parse album response: {}", e))
        })?;

        Ok(self.convert_album(album))
    }

    #[instrument(skip(self, page_token), fields(album_id = ?album_id, page_size = page_size))]
    async fn list_media_items(
        &self,
        page_size: u32,
        page_token: Option<String>,
        album_id: Option<&str>,
    ) -> Result<(Vec<MediaItem>, Option<String>)> {
        let response = match album_id {
            Some(album_id) => {
                // Album-scoped listing goes through mediaItems.search
                let body = SearchMediaItemsRequest {
                    album_id: album_id.to_string(),
                    page_size,
                    page_token,
                };

                let request =
                    HttpRequest::new(HttpMethod::Post, format!("{}/mediaItems:search", PHOTOS_API_BASE))
                        .header("Authorization", self.auth_header())
                        .header("Accept", "application/json")
                        .json(&body)?
                        .timeout(std::time::Duration::from_secs(30));

                self.execute_with_retry(request, 3).await?
            }
            None => {
                let mut url = format!("{}/mediaItems?pageSize={}", PHOTOS_API_BASE, page_size);
                if let Some(token) = &page_token {
                    url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
                }

                self.execute_with_retry(self.get_request(url), 3).await?
            }
        };

        let list_response: MediaItemsResponse =
            serde_json::from_slice(&response.body).map_err(|e| {
                GooglePhotosError::ParseError(format!(
                    "Failed to parse media items response: {}",
                    e
                ))
            })?;

        let items: Vec<MediaItem> = list_response
            .media_items
            .into_iter()
            .map(|item| self.convert_media_item(item))
            .collect();

        debug!("Listed {} media items", items.len());

        Ok((items, list_response.next_page_token))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id, filename = %item.filename))]
    async fn download_media_item(
        &self,
        item: &MediaItem,
        staging_dir: &Path,
    ) -> Result<StagedMedia> {
        let base_url = item.download_url.as_deref().ok_or_else(|| {
            GooglePhotosError::MissingDownloadUrl {
                item_id: item.id.clone(),
            }
        })?;

        // `=d` asks for original photo bytes, `=dv` for original video bytes
        let url = match item.kind {
            MediaKind::Image => format!("{}=d", base_url),
            MediaKind::Video => format!("{}=dv", base_url),
            MediaKind::Other => {
                return Err(GooglePhotosError::UnsupportedMediaKind {
                    item_id: item.id.clone(),
                    mime_type: item.mime_type.clone().unwrap_or_default(),
                }
                .into());
            }
        };

        let path = staging_dir.join(&item.filename);
        info!("Downloading media item to {}", path.display());

        // Base URLs carry their own authorization; no bearer header here
        let mut reader = self.http_client.download_stream(url).await?;
        let mut file = tokio::fs::File::create(&path).await?;

        if let Err(e) = tokio::io::copy(&mut reader, &mut file).await {
            drop(file);
            // Do not leave a truncated file behind
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }
        file.flush().await?;

        Ok(StagedMedia {
            source_id: item.id.clone(),
            filename: item.filename.clone(),
            path,
            mime_type: item.mime_type.clone(),
            creation_time: item.creation_time,
            width: item.width,
            height: item.height,
        })
    }
}
