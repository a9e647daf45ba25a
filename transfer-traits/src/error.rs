use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider capability not available: {0}")]
    NotAvailable(String),

    #[error("Provider operation failed: {0}")]
    OperationFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
