//! Redemption record storage for Gatepass.
//!
//! Records are grouped by ticket group and only ever appended; the gate reads
//! a whole group back and matches in memory.
//!
//! # Storage Backends
//!
//! All backends implement the [`RedemptionStore`] trait:
//!
//! - [`InMemoryRedemptionStore`] -- `HashMap`-based store for tests and embedding
//! - [`JournalRedemptionStore`] -- one append-only JSON-lines file per group
//!
//! # Design Rules
//!
//! 1. Records are immutable once appended; there is no update or delete.
//! 2. `scan` returns a group's records in append order.
//! 3. A record is only accepted under its own ticket group.
//! 4. A store is opened once, shared by handle, and closed at shutdown;
//!    operations on a closed store fail with [`StoreError::Closed`].

pub mod error;
pub mod journal;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use journal::JournalRedemptionStore;
pub use memory::InMemoryRedemptionStore;
pub use traits::RedemptionStore;
