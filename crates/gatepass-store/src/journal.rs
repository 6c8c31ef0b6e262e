use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use gatepass_types::{RedemptionRecord, TicketGroupId};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::RedemptionStore;

/// File-backed redemption store: one append-only JSON-lines journal per group.
///
/// Each group lives in `<root>/<hex(group id)>.jsonl`, one record per line.
/// Hex-encoding the group id keeps arbitrary ids from escaping `root`.
/// Appends are serialized through a single writer lock; scans read the file
/// without taking it, so a scan sees whichever whole lines have landed.
pub struct JournalRedemptionStore {
    root: PathBuf,
    writer: Mutex<()>,
    closed: AtomicBool,
}

impl JournalRedemptionStore {
    /// Open (or create) a journal store rooted at `root`.
    pub async fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        info!(root = %root.display(), "journal store opened");
        Ok(Self {
            root,
            writer: Mutex::new(()),
            closed: AtomicBool::new(false),
        })
    }

    /// Directory holding the group journals.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn journal_path(&self, group: &TicketGroupId) -> PathBuf {
        self.root
            .join(format!("{}.jsonl", hex::encode(group.as_str().as_bytes())))
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl RedemptionStore for JournalRedemptionStore {
    async fn append(&self, group: &TicketGroupId, record: RedemptionRecord) -> StoreResult<()> {
        self.ensure_open()?;
        if record.ticket_group_id != *group {
            return Err(StoreError::GroupMismatch {
                expected: group.clone(),
                actual: record.ticket_group_id,
            });
        }

        let mut line =
            serde_json::to_vec(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        line.push(b'\n');

        let path = self.journal_path(group);
        let _guard = self.writer.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        debug!(group = %group, record = %record.record_id, "journal append");
        Ok(())
    }

    async fn scan(&self, group: &TicketGroupId) -> StoreResult<Vec<RedemptionRecord>> {
        self.ensure_open()?;
        let path = self.journal_path(group);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            // A torn trailing line from a crash is skipped, not fatal.
            match serde_json::from_str::<RedemptionRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(group = %group, line = line_no + 1, error = %e, "skipping unreadable journal line");
                }
            }
        }
        Ok(records)
    }

    async fn close(&self) -> StoreResult<()> {
        // Wait for any in-flight append to finish before refusing new ones.
        let _guard = self.writer.lock().await;
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(root = %self.root.display(), "journal store closed");
        }
        Ok(())
    }
}

impl std::fmt::Debug for JournalRedemptionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalRedemptionStore")
            .field("root", &self.root)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}
