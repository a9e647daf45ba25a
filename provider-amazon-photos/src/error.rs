//! Error types for Amazon Photos provider

use thiserror::Error;

/// Amazon Photos provider errors
#[derive(Error, Debug)]
pub enum AmazonPhotosError {
    /// Token acquisition or refresh failed
    #[error("Authentication failed: {0}")]
    Auth(#[from] core_auth::AuthError),

    /// API request returned an error
    #[error("Amazon Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Provider error
    #[error(transparent)]
    Provider(#[from] transfer_traits::error::ProviderError),
}

/// Result type for Amazon Photos operations
pub type Result<T> = std::result::Result<T, AmazonPhotosError>;

impl From<AmazonPhotosError> for transfer_traits::error::ProviderError {
    fn from(error: AmazonPhotosError) -> Self {
        match error {
            AmazonPhotosError::Auth(e) => {
                transfer_traits::error::ProviderError::AuthenticationFailed(e.to_string())
            }
            AmazonPhotosError::ApiError {
                status_code,
                message,
            } => transfer_traits::error::ProviderError::OperationFailed(format!(
                "Amazon Drive API error (status {}): {}",
                status_code, message
            )),
            AmazonPhotosError::ParseError(msg) => {
                transfer_traits::error::ProviderError::OperationFailed(format!(
                    "Parse error: {}",
                    msg
                ))
            }
            AmazonPhotosError::Provider(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AmazonPhotosError::ApiError {
            status_code: 409,
            message: "Name already exists".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Amazon Drive API error (status 409): Name already exists"
        );
    }

    #[test]
    fn test_auth_error_conversion() {
        let error = AmazonPhotosError::Auth(core_auth::AuthError::TokenRefreshFailed(
            "invalid_grant".to_string(),
        ));
        let provider_error: transfer_traits::error::ProviderError = error.into();

        assert!(matches!(
            provider_error,
            transfer_traits::error::ProviderError::AuthenticationFailed(_)
        ));
    }

    #[test]
    fn test_api_error_conversion() {
        let error = AmazonPhotosError::ApiError {
            status_code: 500,
            message: "Internal error".to_string(),
        };
        let provider_error: transfer_traits::error::ProviderError = error.into();

        assert!(matches!(
            provider_error,
            transfer_traits::error::ProviderError::OperationFailed(_)
        ));
    }
}
