use thiserror::Error;
use transfer_traits::error::ProviderError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Authentication error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl From<AuthError> for ProviderError {
    fn from(err: AuthError) -> Self {
        ProviderError::AuthenticationFailed(err.to_string())
    }
}
