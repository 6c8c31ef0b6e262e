use gatepass_types::Digest;
use sha2::{Digest as _, Sha256};

/// Deterministic SHA-256 digest of structured payloads.
///
/// The canonical form is compact JSON with object keys in lexicographic
/// order. Any serializable value is first lowered to a `serde_json::Value`
/// (whose maps are key-sorted), then written out, so a typed order on the
/// issuing side and an arbitrary JSON document on the verifying side hash to
/// the same bytes whenever they are semantically equal.
pub struct CanonicalHasher;

impl CanonicalHasher {
    /// The exact bytes that get hashed for `value`.
    pub fn canonical_bytes<T: serde::Serialize + ?Sized>(
        value: &T,
    ) -> Result<Vec<u8>, HasherError> {
        let value =
            serde_json::to_value(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        serde_json::to_vec(&value).map_err(|e| HasherError::Serialization(e.to_string()))
    }

    /// Canonicalize and hash a serializable value.
    pub fn digest<T: serde::Serialize + ?Sized>(value: &T) -> Result<Digest, HasherError> {
        let bytes = Self::canonical_bytes(value)?;
        Ok(Self::digest_bytes(&bytes))
    }

    /// Raw SHA-256 of already-canonical bytes.
    pub fn digest_bytes(data: &[u8]) -> Digest {
        Digest::from_hash(Sha256::digest(data).into())
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
