//! Amazon Photos provider
//!
//! Write side of the transfer pipeline: creates albums, uploads staged
//! media files, and links photos into albums through the Amazon Drive v1
//! API. Authentication runs through `core_auth::TokenManager` with Login
//! with Amazon refresh tokens.
//!
//! # Usage
//!
//! ```ignore
//! use provider_amazon_photos::AmazonPhotosConnector;
//! use transfer_traits::destination::MediaDestination;
//!
//! let connector = AmazonPhotosConnector::new(http_client, token_manager);
//! let outcome = connector.upload_photo(&staged_path, Some(&metadata)).await?;
//! ```

pub mod connector;
pub mod error;
pub mod types;

pub use connector::AmazonPhotosConnector;
pub use error::{AmazonPhotosError, Result};
