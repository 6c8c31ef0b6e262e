use async_trait::async_trait;
use gatepass_types::{RedemptionRecord, TicketGroupId};

use crate::error::StoreResult;

/// Durable, append-only store of redemption records keyed by ticket group.
///
/// All implementations must satisfy these invariants:
/// - Records are never mutated or removed once appended.
/// - `scan` returns every record visible for the group, in append order.
///   A record appended concurrently with a scan may or may not be included.
/// - `append` rejects a record whose `ticket_group_id` differs from `group`.
/// - After `close`, both operations fail with `StoreError::Closed`.
#[async_trait]
pub trait RedemptionStore: Send + Sync {
    /// Append a record under `group`.
    async fn append(&self, group: &TicketGroupId, record: RedemptionRecord) -> StoreResult<()>;

    /// Read back all records of `group`. An unknown group yields an empty list.
    async fn scan(&self, group: &TicketGroupId) -> StoreResult<Vec<RedemptionRecord>>;

    /// Flush and release the backend. Idempotent.
    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }
}
