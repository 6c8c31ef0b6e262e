use gatepass_crypto::{CanonicalHasher, Signature, SignatureService};
use tracing::debug;

use crate::error::CoreResult;

/// Stateless re-verification of a receipt against arbitrary order data.
///
/// Callable by anyone holding a receipt; touches no store and no private key.
#[derive(Clone, Copy, Debug, Default)]
pub struct VerificationService {
    signer: SignatureService,
}

impl VerificationService {
    pub fn new(signer: SignatureService) -> Self {
        Self { signer }
    }

    /// Verify, distinguishing a mismatch (`Ok(false)`) from input that cannot
    /// be processed at all (`Err`).
    pub fn check<T: serde::Serialize + ?Sized>(
        &self,
        original_data: &T,
        public_key_pem: &str,
        digital_signature: &str,
    ) -> CoreResult<bool> {
        let digest = CanonicalHasher::digest(original_data)?;
        let signature = Signature::from_base64(digital_signature)?;
        Ok(self.signer.verify(&digest, &signature, public_key_pem)?)
    }

    /// Verify, folding every failure into `false`.
    ///
    /// The reason for a structural failure is logged, never raised.
    pub fn verify<T: serde::Serialize + ?Sized>(
        &self,
        original_data: &T,
        public_key_pem: &str,
        digital_signature: &str,
    ) -> bool {
        match self.check(original_data, public_key_pem, digital_signature) {
            Ok(valid) => valid,
            Err(e) => {
                debug!(error = %e, "receipt verification rejected input");
                false
            }
        }
    }
}
