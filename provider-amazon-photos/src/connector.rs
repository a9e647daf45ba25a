//! Amazon Photos API connector implementation
//!
//! Implements the `MediaDestination` trait over the Amazon Drive v1 API.
//! Amazon Photos stores photos as FILE nodes under the account's Photos
//! folder; albums are FOLDER nodes carrying the ALBUM label.

use async_trait::async_trait;
use bytes::Bytes;
use core_auth::TokenManager;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use transfer_traits::destination::MediaDestination;
use transfer_traits::error::Result;
use transfer_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use transfer_traits::media::{RemoteAlbum, RemotePhoto, UploadMetadata, UploadOutcome};

use crate::error::AmazonPhotosError;
use crate::types::{
    AmazonNode, CreateNodeRequest, NodesResponse, UploadSessionRequest, UploadSessionResponse,
};

/// Amazon Drive API base URL
const DRIVE_API_BASE: &str = "https://api.amazon.com/drive/v1";

/// Name of the Drive folder that backs Amazon Photos
const PHOTOS_FOLDER_NAME: &str = "Photos";

/// Label that marks a folder node as an album
const ALBUM_LABEL: &str = "ALBUM";

/// Maximum nodes returned by one filtered listing
const NODE_LIST_LIMIT: u32 = 1000;

/// Timeout for metadata requests; content uploads run without one
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Amazon Photos API connector
///
/// Implements `MediaDestination` for the Amazon Drive v1 API.
///
/// # Features
///
/// - Album lookup and creation as labeled folder nodes
/// - Three-step uploads: session, presigned content PUT, properties patch
/// - Album membership through node parent lists
/// - Exponential backoff for rate limiting
/// - Token refresh through `core_auth::TokenManager`
///
/// # Example
///
/// ```ignore
/// use provider_amazon_photos::AmazonPhotosConnector;
/// use transfer_traits::destination::MediaDestination;
///
/// let connector = AmazonPhotosConnector::new(http_client, token_manager);
/// let album = connector.create_album("Vacation 2023", None).await?;
/// ```
pub struct AmazonPhotosConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Supplies a valid Login with Amazon access token per request
    token_manager: TokenManager,

    /// Photos folder node ID, resolved once and reused for the session
    photos_folder: Mutex<Option<String>>,
}

impl AmazonPhotosConnector {
    /// Create a new Amazon Photos connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `token_manager` - Token manager holding Login with Amazon credentials
    pub fn new(http_client: Arc<dyn HttpClient>, token_manager: TokenManager) -> Self {
        Self {
            http_client,
            token_manager,
            photos_folder: Mutex::new(None),
        }
    }

    /// Build authorization header value, refreshing the token when needed
    async fn auth_header(&self) -> Result<String> {
        let token = self
            .token_manager
            .access_token()
            .await
            .map_err(AmazonPhotosError::Auth)?;
        Ok(format!("Bearer {}", token))
    }

    /// Run a filtered nodes query
    async fn query_nodes(&self, filters: &str, limit: Option<u32>) -> Result<NodesResponse> {
        let mut url = format!(
            "{}/nodes?filters={}&asset=ALL",
            DRIVE_API_BASE,
            urlencoding::encode(filters)
        );
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={}", limit));
        }

        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Authorization", self.auth_header().await?)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self.execute_with_retry(request, 3).await?;

        serde_json::from_slice(&response.body).map_err(|e| {
            AmazonPhotosError::ParseError(format!("Failed to parse nodes response: {}", e)).into()
        })
    }

    /// Resolve the Photos folder node, creating it when absent
    ///
    /// The ID is cached for the lifetime of the connector; every upload and
    /// listing reuses the same parent folder.
    async fn photos_folder_id(&self) -> Result<String> {
        let mut cached = self.photos_folder.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        let filters = format!("kind:FOLDER AND name:{}", PHOTOS_FOLDER_NAME);
        let listing = self.query_nodes(&filters, None).await?;

        let id = match listing.data.into_iter().next() {
            Some(node) => node.id,
            None => {
                info!("Photos folder not found, creating it");
                self.create_photos_folder().await?
            }
        };

        *cached = Some(id.clone());
        Ok(id)
    }

    /// Create the Photos folder under the account's root node
    async fn create_photos_folder(&self) -> Result<String> {
        let request = HttpRequest::new(HttpMethod::Get, format!("{}/nodes/root", DRIVE_API_BASE))
            .header("Authorization", self.auth_header().await?)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        let response = self.execute_with_retry(request, 3).await?;
        let root: AmazonNode = serde_json::from_slice(&response.body).map_err(|e| {
            AmazonPhotosError::ParseError(format!("Failed to parse root node: {}", e))
        })?;

        let body = CreateNodeRequest {
            name: PHOTOS_FOLDER_NAME.to_string(),
            kind: "FOLDER".to_string(),
            labels: Vec::new(),
            parents: vec![root.id],
            description: None,
        };

        let request = HttpRequest::new(HttpMethod::Post, format!("{}/nodes", DRIVE_API_BASE))
            .header("Authorization", self.auth_header().await?)
            .header("Accept", "application/json")
            .json(&body)?
            .timeout(REQUEST_TIMEOUT);

        let response = self.execute_with_retry(request, 3).await?;
        let folder: AmazonNode = serde_json::from_slice(&response.body).map_err(|e| {
            AmazonPhotosError::ParseError(format!("Failed to parse created folder: {}", e))
        })?;

        info!("Created Photos folder with ID {}", folder.id);

        Ok(folder.id)
    }

    /// Run the three-step upload conversation, returning the new node ID
    async fn try_upload(
        &self,
        path: &Path,
        filename: &str,
        metadata: Option<&UploadMetadata>,
    ) -> Result<String> {
        // Read the staged file up front; a missing file fails the item
        // without opening an upload session.
        let content = tokio::fs::read(path).await.map_err(|e| {
            transfer_traits::error::ProviderError::OperationFailed(format!(
                "Cannot read staged file {}: {}",
                path.display(),
                e
            ))
        })?;

        let content_type = content_type_for(filename);
        let photos_folder = self.photos_folder_id().await?;

        // Step 1: open the upload session
        debug!("Creating upload session for {}", filename);
        let session_body = UploadSessionRequest {
            content_type: content_type.to_string(),
            name: filename.to_string(),
            parents: vec![photos_folder],
            size: content.len() as u64,
        };

        let request =
            HttpRequest::new(HttpMethod::Post, format!("{}/files/upload", DRIVE_API_BASE))
                .header("Authorization", self.auth_header().await?)
                .header("Accept", "application/json")
                .json(&session_body)?
                .timeout(REQUEST_TIMEOUT);

        let response = self.execute_with_retry(request, 3).await?;
        let session: UploadSessionResponse = serde_json::from_slice(&response.body).map_err(|e| {
            AmazonPhotosError::ParseError(format!("Failed to parse upload session response: {}", e))
        })?;

        // Step 2: PUT the bytes to the presigned URL. The URL carries its own
        // authorization, so no bearer header here.
        debug!("Uploading {} bytes for {}", content.len(), filename);
        let request = HttpRequest::new(HttpMethod::Put, session.upload_url)
            .header("Content-Type", content_type)
            .body(Bytes::from(content));

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(AmazonPhotosError::ApiError {
                status_code: response.status,
                message: String::from_utf8_lossy(&response.body).to_string(),
            }
            .into());
        }

        // Step 3: attach source-side metadata as node properties
        if let Some(metadata) = metadata {
            let properties = build_properties(metadata);
            let request = HttpRequest::new(
                HttpMethod::Patch,
                format!("{}/nodes/{}", DRIVE_API_BASE, session.id),
            )
            .header("Authorization", self.auth_header().await?)
            .header("Accept", "application/json")
            .json(&serde_json::json!({ "properties": properties }))?
            .timeout(REQUEST_TIMEOUT);

            self.execute_with_retry(request, 3).await?;
        }

        Ok(session.id)
    }

    /// Ensure the album is among the photo's parents
    ///
    /// Returns `true` when the photo was already a member.
    async fn try_link(&self, photo_id: &str, album_id: &str) -> Result<bool> {
        let request = HttpRequest::new(
            HttpMethod::Get,
            format!("{}/nodes/{}", DRIVE_API_BASE, photo_id),
        )
        .header("Authorization", self.auth_header().await?)
        .header("Accept", "application/json")
        .timeout(REQUEST_TIMEOUT);

        let response = self.execute_with_retry(request, 3).await?;
        let node: AmazonNode = serde_json::from_slice(&response.body).map_err(|e| {
            AmazonPhotosError::ParseError(format!("Failed to parse photo node: {}", e))
        })?;

        if node.parents.iter().any(|p| p == album_id) {
            return Ok(true);
        }

        let mut parents = node.parents;
        parents.push(album_id.to_string());

        let request = HttpRequest::new(
            HttpMethod::Patch,
            format!("{}/nodes/{}", DRIVE_API_BASE, photo_id),
        )
        .header("Authorization", self.auth_header().await?)
        .header("Accept", "application/json")
        .json(&serde_json::json!({ "parents": parents }))?
        .timeout(REQUEST_TIMEOUT);

        self.execute_with_retry(request, 3).await?;

        Ok(false)
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

                    if response.is_success() {
                        debug!("API request succeeded: status={}", status);
                        return Ok(response);
                    } else if status == 429 || response.is_server_error() {
                        // Rate limit or server error - retry with backoff
                        attempt += 1;
                        if attempt >= max_retries {
                            warn!(
                                "API request failed after {} attempts: status={}",
                                max_retries, status
                            );
                            return Err(AmazonPhotosError::ApiError {
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
                        return Err(AmazonPhotosError::ApiError {
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
impl MediaDestination for AmazonPhotosConnector {
    #[instrument(skip(self), fields(name = %name))]
    async fn get_album_by_name(&self, name: &str) -> Result<Option<RemoteAlbum>> {
        let filters = format!("kind:FOLDER AND labels:{} AND name:'{}'", ALBUM_LABEL, name);
        let listing = self.query_nodes(&filters, None).await?;

        match listing.data.into_iter().next() {
            Some(node) => {
                debug!("Found album '{}' with ID {}", name, node.id);
                Ok(Some(RemoteAlbum {
                    id: node.id,
                    name: node.name.unwrap_or_else(|| name.to_string()),
                }))
            }
            None => {
                debug!("Album '{}' not found", name);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, description), fields(name = %name))]
    async fn create_album(&self, name: &str, description: Option<&str>) -> Result<RemoteAlbum> {
        let photos_folder = self.photos_folder_id().await?;

        let body = CreateNodeRequest {
            name: name.to_string(),
            kind: "FOLDER".to_string(),
            labels: vec![ALBUM_LABEL.to_string()],
            parents: vec![photos_folder],
            description: description.map(|d| d.to_string()),
        };

        let request = HttpRequest::new(HttpMethod::Post, format!("{}/nodes", DRIVE_API_BASE))
            .header("Authorization", self.auth_header().await?)
            .header("Accept", "application/json")
            .json(&body)?
            .timeout(REQUEST_TIMEOUT);

        let response = self.execute_with_retry(request, 3).await?;
        let node: AmazonNode = serde_json::from_slice(&response.body).map_err(|e| {
            AmazonPhotosError::ParseError(format!("Failed to parse created album: {}", e))
        })?;

        info!("Created album '{}' with ID {}", name, node.id);

        Ok(RemoteAlbum {
            id: node.id,
            name: node.name.unwrap_or_else(|| name.to_string()),
        })
    }

    #[instrument(skip(self), fields(album_id = ?album_id))]
    async fn list_photos(&self, album_id: Option<&str>) -> Result<Vec<RemotePhoto>> {
        let parent = match album_id {
            Some(id) => id.to_string(),
            None => self.photos_folder_id().await?,
        };

        let filters = format!("kind:FILE AND parents:{}", parent);
        let listing = self.query_nodes(&filters, Some(NODE_LIST_LIMIT)).await?;

        let photos: Vec<RemotePhoto> = listing
            .data
            .into_iter()
            .map(|node| RemotePhoto {
                id: node.id,
                name: node.name.unwrap_or_default(),
            })
            .collect();

        info!("Found {} photos in Amazon Photos", photos.len());

        Ok(photos)
    }

    #[instrument(skip(self, metadata), fields(path = %path.display()))]
    async fn upload_photo(
        &self,
        path: &Path,
        metadata: Option<&UploadMetadata>,
    ) -> Result<UploadOutcome> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match self.try_upload(path, &filename, metadata).await {
            Ok(photo_id) => {
                info!("Uploaded {} as node {}", filename, photo_id);
                Ok(UploadOutcome::succeeded(photo_id, filename))
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", filename, e);
                Ok(UploadOutcome::failed(filename, e.to_string()))
            }
        }
    }

    #[instrument(skip(self), fields(photo_id = %photo_id, album_id = %album_id))]
    async fn add_photo_to_album(&self, photo_id: &str, album_id: &str) -> Result<bool> {
        match self.try_link(photo_id, album_id).await {
            Ok(true) => {
                debug!("Photo {} already in album {}", photo_id, album_id);
                Ok(true)
            }
            Ok(false) => {
                info!("Added photo {} to album {}", photo_id, album_id);
                Ok(true)
            }
            Err(e) => {
                warn!(
                    "Could not add photo {} to album {}: {}",
                    photo_id, album_id, e
                );
                Ok(false)
            }
        }
    }
}

/// Infer an upload content type from the file extension
fn content_type_for(filename: &str) -> &'static str {
    match Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Render upload metadata as node properties
///
/// Amazon Drive stores properties as strings, so every value is stringified.
fn build_properties(metadata: &UploadMetadata) -> HashMap<&'static str, String> {
    let mut properties = HashMap::new();
    properties.insert("source_id", metadata.source_id.clone());
    if let Some(creation_time) = metadata.creation_time {
        properties.insert("creation_time", creation_time.to_rfc3339());
    }
    if let Some(width) = metadata.width {
        properties.insert("width", width.to_string());
    }
    if let Some(height) = metadata.height {
        properties.insert("height", height.to_string());
    }
    properties.insert("kind", metadata.kind.to_string());
    properties
}
