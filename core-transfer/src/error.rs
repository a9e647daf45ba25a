use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Provider error: {0}")]
    Provider(#[from] transfer_traits::error::ProviderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid phase transition from {from} to {to}")]
    InvalidPhaseTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, TransferError>;
