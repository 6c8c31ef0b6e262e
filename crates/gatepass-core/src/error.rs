use gatepass_crypto::{HasherError, SignatureError};
use gatepass_store::StoreError;
use gatepass_types::TypeError;
use thiserror::Error;

/// Errors surfaced by the issuance, redemption and verification services.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The order failed structural validation; nothing was signed or stored.
    #[error("invalid order: {0}")]
    InvalidOrder(#[from] TypeError),

    /// The payload could not be canonicalized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Key material or signature encoding could not be parsed.
    #[error("malformed key material: {0}")]
    KeyFormat(String),

    /// The redemption store failed a read or write.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Key generation, hashing or signing failed during issuance.
    #[error("issuance failed: {0}")]
    Issuance(String),
}

impl From<HasherError> for CoreError {
    fn from(e: HasherError) -> Self {
        match e {
            HasherError::Serialization(msg) => Self::Serialization(msg),
        }
    }
}

impl From<SignatureError> for CoreError {
    fn from(e: SignatureError) -> Self {
        match e {
            SignatureError::KeyFormat(msg) | SignatureError::InvalidEncoding(msg) => {
                Self::KeyFormat(msg)
            }
            other => Self::Issuance(other.to_string()),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
