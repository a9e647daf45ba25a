//! # Transfer Provider Traits
//!
//! Capability seams between the transfer engine and the cloud photo services
//! it moves media between.
//!
//! ## Overview
//!
//! This crate defines the contract the engine programs against. Each trait
//! represents one side of a transfer, implemented per vendor by a connector
//! crate. The engine holds `Arc<dyn MediaSource>` and
//! `Arc<dyn MediaDestination>` and never names a vendor.
//!
//! ## Traits
//!
//! - [`MediaSource`](source::MediaSource) - Listing albums and media, staging downloads
//! - [`MediaDestination`](destination::MediaDestination) - Album creation, uploads, membership
//! - [`HttpClient`](http::HttpClient) - Async HTTP with bearer auth, retry, streaming
//!
//! ## Error Handling
//!
//! All traits use the [`ProviderError`](error::ProviderError) type. Connector
//! implementations should:
//!
//! - Convert vendor-specific errors to `ProviderError`
//! - Provide actionable error messages
//! - Keep per-item upload failures inside [`UploadOutcome`](media::UploadOutcome)
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` bounds so connectors can be shared
//! across async tasks behind `Arc`.

pub mod destination;
pub mod error;
pub mod http;
pub mod media;
pub mod source;

pub use error::ProviderError;

// Re-export commonly used types
pub use destination::MediaDestination;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use media::{
    Album, MediaItem, MediaKind, RemoteAlbum, RemotePhoto, StagedMedia, UploadMetadata,
    UploadOutcome,
};
pub use source::MediaSource;
