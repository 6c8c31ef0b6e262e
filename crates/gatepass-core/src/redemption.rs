use std::sync::Arc;

use gatepass_crypto::RedemptionTokenCodec;
use gatepass_store::RedemptionStore;
use gatepass_types::{OwnerId, TicketGroupId};
use tracing::debug;

use crate::error::CoreResult;

/// Gate-side check of a presented `(ownerId, pin)` against a ticket group.
///
/// Read-only: one scan of the group followed by in-memory matching, so any
/// number of redemptions may run alongside each other and alongside issuance.
/// Records are not consumed; the same ticket redeems as often as it is shown.
#[derive(Clone)]
pub struct RedemptionService {
    store: Arc<dyn RedemptionStore>,
}

impl RedemptionService {
    pub fn new(store: Arc<dyn RedemptionStore>) -> Self {
        Self { store }
    }

    /// `true` iff the group holds a record for `owner_id` whose token matches
    /// `pin`.
    ///
    /// When an owner has several records in the group, the last one in scan
    /// order decides.
    pub async fn redeem(
        &self,
        group: &TicketGroupId,
        owner_id: &OwnerId,
        pin: &str,
    ) -> CoreResult<bool> {
        let records = self.store.scan(group).await?;
        let Some(record) = records.iter().rev().find(|r| r.owner_id == *owner_id) else {
            debug!(group = %group, owner = %owner_id, scanned = records.len(), "no record for owner");
            return Ok(false);
        };

        let valid = RedemptionTokenCodec::matches(&record.redemption_token, owner_id, pin);
        debug!(group = %group, owner = %owner_id, record = %record.record_id, valid, "redemption checked");
        Ok(valid)
    }
}

impl std::fmt::Debug for RedemptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedemptionService").finish_non_exhaustive()
    }
}
