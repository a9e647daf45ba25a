//! Media Domain Types
//!
//! Vendor-neutral records exchanged between the transfer engine and the
//! provider connectors. Connectors translate their wire DTOs into these;
//! the engine never sees vendor JSON.

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;

/// Broad content classification of a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    /// Classify a MIME type by its prefix (`image/`, `video/`)
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Other => "other",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A media item as listed from the source service
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    /// Source-service identifier
    pub id: String,
    /// Original filename; also the per-album deduplication key
    pub filename: String,
    pub kind: MediaKind,
    /// MIME type as reported by the source, when known
    pub mime_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub creation_time: Option<DateTime<Utc>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Short-lived download locator, refreshed with every listing page.
    /// Must never be persisted across runs.
    pub download_url: Option<String>,
}

/// An album as listed from the source service
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub item_count: Option<u64>,
}

/// A media file staged on local disk, ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct StagedMedia {
    /// Identifier of the source item this file came from
    pub source_id: String,
    pub filename: String,
    pub path: PathBuf,
    pub mime_type: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Source-side descriptive metadata attached to an upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadMetadata {
    pub source_id: String,
    pub creation_time: Option<DateTime<Utc>>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub kind: MediaKind,
}

/// Result of a single upload attempt
///
/// Vendor-side rejections travel through this record rather than through
/// `Err`, so one bad file never aborts a run.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub success: bool,
    /// Destination-service identifier of the uploaded photo, on success
    pub photo_id: Option<String>,
    pub filename: String,
    pub error: Option<String>,
}

impl UploadOutcome {
    pub fn succeeded(photo_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            success: true,
            photo_id: Some(photo_id.into()),
            filename: filename.into(),
            error: None,
        }
    }

    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            photo_id: None,
            filename: filename.into(),
            error: Some(error.into()),
        }
    }
}

/// An album as it exists on the destination service
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAlbum {
    pub id: String,
    pub name: String,
}

/// A photo as it exists on the destination service
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePhoto {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("application/pdf"), MediaKind::Other);
    }

    #[test]
    fn test_media_kind_display() {
        assert_eq!(MediaKind::Image.to_string(), "image");
        assert_eq!(MediaKind::Video.to_string(), "video");
        assert_eq!(MediaKind::Other.to_string(), "other");
    }

    #[test]
    fn test_upload_outcome_succeeded() {
        let outcome = UploadOutcome::succeeded("node-1", "IMG_0001.jpg");

        assert!(outcome.success);
        assert_eq!(outcome.photo_id.as_deref(), Some("node-1"));
        assert_eq!(outcome.filename, "IMG_0001.jpg");
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_upload_outcome_failed() {
        let outcome = UploadOutcome::failed("IMG_0001.jpg", "quota exceeded");

        assert!(!outcome.success);
        assert!(outcome.photo_id.is_none());
        assert_eq!(outcome.error.as_deref(), Some("quota exceeded"));
    }
}
