use serde::{Deserialize, Serialize};

/// Proof of purchase returned to the buyer.
///
/// The buyer is the sole custodian of the receipt; nothing in the system
/// keeps a copy. The public key is SPKI PEM and the signature is base64.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedReceipt {
    pub public_key: String,
    pub digital_signature: String,
}
