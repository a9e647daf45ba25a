//! # Authentication Module
//!
//! OAuth 2.0 token lifecycle for destination services.
//!
//! ## Overview
//!
//! This module keeps a valid access token available for authenticated API
//! calls. It refreshes tokens through the RFC 6749 refresh-token grant,
//! caches the current token set, and refreshes again shortly before expiry.
//! Interactive authorization (obtaining the initial refresh token) happens
//! outside this tool.
//!
//! ## Features
//!
//! - Refresh-token grant with retry on transient endpoint failures
//! - Expiry-buffered token caching
//! - Refresh token retention when the server omits a rotated one
//! - Redacted `Debug` output for token material

pub mod error;
pub mod oauth;
pub mod types;

pub use error::{AuthError, Result};
pub use oauth::{OAuthConfig, TokenManager};
pub use types::OAuthTokens;
