use gatepass_crypto::{CanonicalHasher, RedemptionTokenCodec, SignatureService};
use gatepass_types::{OrderPayload, OwnerId, RedemptionRecord, SignedReceipt};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::writer::{PendingWrites, RecordWriter};

/// A signed receipt plus the background writes of its redemption records.
#[derive(Debug)]
pub struct IssuedOrder {
    pub receipt: SignedReceipt,
    pub pending: PendingWrites,
}

/// Signs orders with a fresh keypair and records a redemption token per item.
///
/// The order is always hashed and signed before any record is handed to the
/// writer, so a failed signature never leaves records behind. Record writes
/// are not awaited: the receipt is returned while they may still be in
/// flight, and a failed write is logged without failing the receipt.
#[derive(Clone, Debug)]
pub struct IssuanceService {
    signer: SignatureService,
    writer: RecordWriter,
}

impl IssuanceService {
    pub fn new(signer: SignatureService, writer: RecordWriter) -> Self {
        Self { signer, writer }
    }

    pub fn writer(&self) -> &RecordWriter {
        &self.writer
    }

    /// Issue a receipt for `order` on behalf of an already-authorized caller.
    pub async fn issue(
        &self,
        caller: &OwnerId,
        order: &OrderPayload,
        pin: &str,
    ) -> CoreResult<IssuedOrder> {
        order.validate()?;

        let signer = self.signer;
        let keypair = tokio::task::spawn_blocking(move || signer.generate_keypair())
            .await
            .map_err(|e| CoreError::Issuance(format!("key generation task: {e}")))?
            .map_err(|e| CoreError::Issuance(e.to_string()))?;

        let digest =
            CanonicalHasher::digest(order).map_err(|e| CoreError::Issuance(e.to_string()))?;
        let signature = keypair
            .sign(&digest)
            .map_err(|e| CoreError::Issuance(e.to_string()))?;
        debug!(digest = %digest.short_hex(), "order signed");

        let records = order.items().iter().map(|item| {
            let token = RedemptionTokenCodec::derive(&item.owner_id, pin);
            RedemptionRecord::for_item(item, token)
        });
        let pending = self.writer.submit_all(records);

        info!(caller = %caller, items = order.len(), "receipt issued");
        Ok(IssuedOrder {
            receipt: SignedReceipt {
                public_key: keypair.public_key_pem().to_owned(),
                digital_signature: signature.to_base64(),
            },
            pending,
        })
    }
}
