//! Error types for Google Photos provider

use thiserror::Error;

/// Google Photos provider errors
#[derive(Error, Debug)]
pub enum GooglePhotosError {
    /// API request returned an error
    #[error("Google Photos API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Media item arrived without a content locator
    #[error("Media item {item_id} has no download URL")]
    MissingDownloadUrl { item_id: String },

    /// Media item is neither a photo nor a video
    #[error("Unsupported media kind for item {item_id}: {mime_type}")]
    UnsupportedMediaKind { item_id: String, mime_type: String },

    /// Provider error
    #[error(transparent)]
    Provider(#[from] transfer_traits::error::ProviderError),
}

/// Result type for Google Photos operations
pub type Result<T> = std::result::Result<T, GooglePhotosError>;

impl From<GooglePhotosError> for transfer_traits::error::ProviderError {
    fn from(error: GooglePhotosError) -> Self {
        match error {
            GooglePhotosError::ApiError {
                status_code,
                message,
            } => transfer_traits::error::ProviderError::OperationFailed(format!(
                "Google Photos API error (status {}): {}",
                status_code, message
            )),
            GooglePhotosError::ParseError(msg) => {
                transfer_traits::error::ProviderError::OperationFailed(format!(
                    "Parse error: {}",
                    msg
                ))
            }
            GooglePhotosError::MissingDownloadUrl { item_id } => {
                transfer_traits::error::ProviderError::OperationFailed(format!(
                    "Media item {} has no download URL",
                    item_id
                ))
            }
            GooglePhotosError::UnsupportedMediaKind { item_id, mime_type } => {
                transfer_traits::error::ProviderError::OperationFailed(format!(
                    "Unsupported media kind for item {}: {}",
                    item_id, mime_type
                ))
            }
            GooglePhotosError::Provider(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = GooglePhotosError::ApiError {
            status_code: 403,
            message: "Insufficient scope".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Google Photos API error (status 403): Insufficient scope"
        );
    }

    #[test]
    fn test_error_conversion() {
        let error = GooglePhotosError::MissingDownloadUrl {
            item_id: "media1".to_string(),
        };
        let provider_error: transfer_traits::error::ProviderError = error.into();

        assert!(matches!(
            provider_error,
            transfer_traits::error::ProviderError::OperationFailed(_)
        ));
    }
}
