use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use gatepass_types::{RedemptionRecord, TicketGroupId};

use crate::error::{StoreError, StoreResult};
use crate::traits::RedemptionStore;

type Groups = HashMap<TicketGroupId, Vec<RedemptionRecord>>;

/// In-memory, HashMap-based redemption store.
///
/// Intended for tests and embedding. Groups are held behind a `RwLock`, so
/// scans run in parallel and appends are serialized.
pub struct InMemoryRedemptionStore {
    groups: RwLock<Groups>,
    closed: AtomicBool,
}

impl InMemoryRedemptionStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Total number of records across all groups.
    pub fn len(&self) -> usize {
        self.read_groups()
            .map(|groups| groups.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of groups that hold at least one record.
    pub fn groups(&self) -> Vec<TicketGroupId> {
        let mut ids: Vec<TicketGroupId> = self
            .read_groups()
            .map(|groups| groups.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn read_groups(&self) -> StoreResult<RwLockReadGuard<'_, Groups>> {
        self.groups
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }

    fn write_groups(&self) -> StoreResult<RwLockWriteGuard<'_, Groups>> {
        self.groups
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".into()))
    }
}

impl Default for InMemoryRedemptionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RedemptionStore for InMemoryRedemptionStore {
    async fn append(&self, group: &TicketGroupId, record: RedemptionRecord) -> StoreResult<()> {
        self.ensure_open()?;
        if record.ticket_group_id != *group {
            return Err(StoreError::GroupMismatch {
                expected: group.clone(),
                actual: record.ticket_group_id,
            });
        }
        self.write_groups()?
            .entry(group.clone())
            .or_default()
            .push(record);
        Ok(())
    }

    async fn scan(&self, group: &TicketGroupId) -> StoreResult<Vec<RedemptionRecord>> {
        self.ensure_open()?;
        Ok(self.read_groups()?.get(group).cloned().unwrap_or_default())
    }

    async fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryRedemptionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRedemptionStore")
            .field("record_count", &self.len())
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}
