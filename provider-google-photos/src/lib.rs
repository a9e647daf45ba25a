//! Google Photos provider
//!
//! Read side of the transfer pipeline: lists albums and media items from
//! the Google Photos Library API v1 and stages original photo and video
//! bytes for upload.
//!
//! # Usage
//!
//! ```ignore
//! use provider_google_photos::GooglePhotosConnector;
//! use transfer_traits::source::MediaSource;
//!
//! let connector = GooglePhotosConnector::new(http_client, access_token);
//! let albums = connector.list_albums().await?;
//! let (items, next) = connector.list_media_items(50, None, None).await?;
//! ```

pub mod connector;
pub mod error;
pub mod types;

pub use connector::GooglePhotosConnector;
pub use error::{GooglePhotosError, Result};
