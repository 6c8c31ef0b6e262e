use std::sync::Arc;

use gatepass_store::RedemptionStore;
use gatepass_types::{RecordId, RedemptionRecord, TicketGroupId};
use tokio::sync::{broadcast, watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Result of persisting one redemption record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Persisted {
        record_id: RecordId,
        group: TicketGroupId,
    },
    Failed {
        record_id: RecordId,
        group: TicketGroupId,
        reason: String,
    },
}

impl WriteOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted { .. })
    }

    pub fn record_id(&self) -> RecordId {
        match self {
            Self::Persisted { record_id, .. } | Self::Failed { record_id, .. } => *record_id,
        }
    }
}

/// Bounded pool of background record appends.
///
/// Each submitted record is written by its own spawned task; at most
/// `concurrency` appends hit the store at once. Every outcome is logged and
/// published to subscribers, so a failed write is never silent even when
/// nobody awaits it. Writes whose handles were dropped are still counted, and
/// [`drain`](Self::drain) waits for all of them before the store is closed.
#[derive(Clone)]
pub struct RecordWriter {
    store: Arc<dyn RedemptionStore>,
    permits: Arc<Semaphore>,
    outcomes: broadcast::Sender<WriteOutcome>,
    in_flight: Arc<watch::Sender<usize>>,
}

/// Counts one submitted write until its task ends, panics included.
struct InFlightGuard(Arc<watch::Sender<usize>>);

impl InFlightGuard {
    fn enter(counter: &Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

impl RecordWriter {
    /// Default number of appends allowed in flight.
    pub const DEFAULT_CONCURRENCY: usize = 16;

    const OUTCOME_CAPACITY: usize = 1024;

    pub fn new(store: Arc<dyn RedemptionStore>, concurrency: usize) -> Self {
        let (outcomes, _) = broadcast::channel(Self::OUTCOME_CAPACITY);
        Self {
            store,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            outcomes,
            in_flight: Arc::new(watch::channel(0).0),
        }
    }

    /// Writes submitted but not yet finished.
    pub fn in_flight(&self) -> usize {
        *self.in_flight.borrow()
    }

    /// Wait until every submitted write has finished, including detached ones.
    ///
    /// Writes submitted while draining are waited for as well.
    pub async fn drain(&self) {
        let mut rx = self.in_flight.subscribe();
        let pending = *rx.borrow();
        if pending > 0 {
            debug!(pending, "draining redemption record writes");
        }
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Receive every write outcome published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<WriteOutcome> {
        self.outcomes.subscribe()
    }

    /// Spawn the append of a single record.
    ///
    /// Must be called from within a tokio runtime. Dropping the returned
    /// handle does not cancel the write.
    pub fn submit(&self, record: RedemptionRecord) -> JoinHandle<WriteOutcome> {
        let store = Arc::clone(&self.store);
        let permits = Arc::clone(&self.permits);
        let outcomes = self.outcomes.clone();
        let guard = InFlightGuard::enter(&self.in_flight);

        tokio::spawn(async move {
            let _guard = guard;
            let record_id = record.record_id;
            let group = record.ticket_group_id.clone();

            let result = match permits.acquire_owned().await {
                Ok(_permit) => store.append(&group, record).await.map_err(|e| e.to_string()),
                Err(_) => Err("writer pool closed".to_owned()),
            };

            let outcome = match result {
                Ok(()) => {
                    debug!(group = %group, record = %record_id, "redemption record persisted");
                    WriteOutcome::Persisted { record_id, group }
                }
                Err(reason) => {
                    error!(group = %group, record = %record_id, error = %reason, "failed to persist redemption record");
                    WriteOutcome::Failed {
                        record_id,
                        group,
                        reason,
                    }
                }
            };

            // No subscribers is fine; the outcome is already logged.
            let _ = outcomes.send(outcome.clone());
            outcome
        })
    }

    /// Spawn appends for a batch of independent records.
    pub fn submit_all(&self, records: impl IntoIterator<Item = RedemptionRecord>) -> PendingWrites {
        PendingWrites {
            handles: records.into_iter().map(|r| self.submit(r)).collect(),
        }
    }
}

impl std::fmt::Debug for RecordWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordWriter")
            .field("available_permits", &self.permits.available_permits())
            .field("subscribers", &self.outcomes.receiver_count())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// Handle on the writes spawned for one issuance.
///
/// Drop it to fire and forget, or [`settle`](Self::settle) it to wait for
/// every write to finish.
#[derive(Debug)]
pub struct PendingWrites {
    handles: Vec<JoinHandle<WriteOutcome>>,
}

impl PendingWrites {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for all writes and summarize them.
    pub async fn settle(self) -> PersistenceReport {
        let mut report = PersistenceReport::default();
        for handle in self.handles {
            match handle.await {
                Ok(outcome) if outcome.is_persisted() => report.persisted += 1,
                Ok(outcome) => report.failed.push(outcome),
                Err(e) => report.aborted.push(e.to_string()),
            }
        }
        report
    }
}

/// Summary of a settled batch of writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistenceReport {
    pub persisted: usize,
    pub failed: Vec<WriteOutcome>,
    /// Write tasks that panicked or were cancelled.
    pub aborted: Vec<String>,
}

impl PersistenceReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.aborted.is_empty()
    }
}
