//! OAuth 2.0 Token Refresh and Session Management
//!
//! This module implements the RFC 6749 refresh-token grant against a cloud
//! service's token endpoint and keeps a valid access token on hand for
//! authenticated API calls.
//!
//! # Overview
//!
//! The token manager handles:
//! - Refreshing access tokens with the refresh-token grant
//! - Retrying transient token endpoint failures with backoff
//! - Caching the current token set and refreshing shortly before expiry
//! - Retaining the previous refresh token when the server omits one
//!
//! # Security
//!
//! - Never logs sensitive values (tokens, client secrets)
//! - Client secrets are optional for public clients
//!
//! # Example
//!
//! ```no_run
//! use core_auth::oauth::{OAuthConfig, TokenManager};
//! use std::sync::Arc;
//!
//! # async fn example() -> core_auth::Result<()> {
//! # use transfer_traits::http::HttpClient;
//! # let http_client: Arc<dyn HttpClient> = todo!();
//! let config = OAuthConfig {
//!     client_id: "your-client-id".to_string(),
//!     client_secret: Some("your-client-secret".to_string()),
//!     token_url: "https://api.amazon.com/auth/o2/token".to_string(),
//! };
//!
//! let manager = TokenManager::new(config, http_client, "stored-refresh-token".to_string());
//! let access_token = manager.access_token().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use bytes::Bytes;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use transfer_traits::http::{HttpClient, HttpMethod, HttpRequest};

/// OAuth 2.0 client configuration.
///
/// Contains everything needed to refresh tokens against one provider.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret (optional for public clients)
    pub client_secret: Option<String>,
    /// Token endpoint URL
    pub token_url: String,
}

/// Current session state guarded by the manager's mutex.
struct TokenState {
    refresh_token: String,
    tokens: Option<OAuthTokens>,
}

/// Caches an access token and refreshes it through the refresh-token grant.
///
/// Connectors call [`access_token`](TokenManager::access_token) before each
/// authenticated request; a refresh happens at most when the cached token is
/// missing or inside its expiry buffer.
pub struct TokenManager {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
    state: Mutex<TokenState>,
}

impl TokenManager {
    /// Create a manager that will mint its first access token on demand
    ///
    /// # Arguments
    ///
    /// * `config` - Client credentials and token endpoint
    /// * `http_client` - HTTP implementation to call the endpoint with
    /// * `refresh_token` - Long-lived refresh token from a prior authorization
    pub fn new(
        config: OAuthConfig,
        http_client: Arc<dyn HttpClient>,
        refresh_token: String,
    ) -> Self {
        Self {
            config,
            http_client,
            state: Mutex::new(TokenState {
                refresh_token,
                tokens: None,
            }),
        }
    }

    /// Create a manager seeded with an existing token set
    ///
    /// Useful when restoring a session whose access token may still be valid.
    pub fn with_tokens(
        config: OAuthConfig,
        http_client: Arc<dyn HttpClient>,
        tokens: OAuthTokens,
    ) -> Self {
        Self {
            config,
            http_client,
            state: Mutex::new(TokenState {
                refresh_token: tokens.refresh_token.clone(),
                tokens: Some(tokens),
            }),
        }
    }

    /// Hand out a valid access token, refreshing first if needed
    ///
    /// # Errors
    ///
    /// Returns an error when no valid token is cached and the refresh grant
    /// fails.
    #[instrument(skip(self))]
    pub async fn access_token(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        if let Some(tokens) = &state.tokens {
            if !tokens.is_expired() {
                return Ok(tokens.access_token.clone());
            }
            debug!("Cached access token inside expiry buffer, refreshing");
        }

        let refreshed = self.refresh_access_token(&state.refresh_token).await?;
        if let Some(remaining) = refreshed.time_until_expiry() {
            debug!(expires_in_secs = remaining.num_seconds(), "Token refreshed");
        }

        state.refresh_token = refreshed.refresh_token.clone();
        let access_token = refreshed.access_token.clone();
        state.tokens = Some(refreshed);

        Ok(access_token)
    }

    /// Exchange a refresh token for a new token set
    ///
    /// Transient endpoint failures (5xx, 429, transport errors after the
    /// client's own retries) are retried with exponential backoff; 4xx
    /// responses fail immediately since a bad grant will not heal.
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - The refresh token from previous authentication
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<OAuthTokens> {
        // Build refresh request
        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("client_id", &self.config.client_id);

        if let Some(ref client_secret) = self.config.client_secret {
            params.insert("client_secret", client_secret);
        }

        debug!("Refreshing access token");

        let encoded_body = serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))?;
        let body = Bytes::from(encoded_body);

        let mut attempts = 0;
        const MAX_RETRIES: u32 = 3;

        loop {
            attempts += 1;

            let request = HttpRequest::new(HttpMethod::Post, self.config.token_url.clone())
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body.clone());

            let response = self
                .http_client
                .execute(request)
                .await
                .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?;

            if response.is_success() {
                let token_response: TokenResponse = response.json().map_err(|e| {
                    AuthError::Other(format!("Failed to parse token response: {}", e))
                })?;

                // Some providers omit the refresh token on refresh; keep
                // using the one we already hold.
                return Ok(OAuthTokens::new(
                    token_response.access_token,
                    token_response
                        .refresh_token
                        .unwrap_or_else(|| refresh_token.to_string()),
                    token_response.expires_in,
                ));
            }

            let status = response.status;

            if response.is_client_error() {
                let error_body = response
                    .text()
                    .unwrap_or_else(|_| "Unable to read error response".to_string());

                warn!(
                    status = status,
                    error = %error_body,
                    "Token refresh failed without retry"
                );

                return Err(AuthError::TokenRefreshFailed(format!(
                    "Token endpoint returned {}: {}",
                    status, error_body
                )));
            }

            if attempts >= MAX_RETRIES {
                let error_body = response
                    .text()
                    .unwrap_or_else(|_| "Unable to read error response".to_string());

                return Err(AuthError::TokenRefreshFailed(format!(
                    "Token refresh failed after {} attempts. Last error: {} - {}",
                    attempts, status, error_body
                )));
            }

            let delay = Duration::from_millis(100 * 2u64.pow(attempts - 1));
            warn!(
                status = status,
                attempts = attempts,
                delay_ms = delay.as_millis(),
                "Token refresh failed, retrying"
            );
            sleep(delay).await;
        }
    }
}

/// Token response from the OAuth provider.
///
/// This structure represents the JSON response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600 // Default to 1 hour if not specified
}
