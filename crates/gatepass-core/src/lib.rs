//! Ticket issuance, gate redemption and receipt verification for Gatepass.
//!
//! Three services sit on top of the crypto and store crates:
//!
//! - [`IssuanceService`] -- hash and sign an order with a per-order keypair,
//!   then hand one redemption record per item to the [`RecordWriter`]
//! - [`RedemptionService`] -- recompute a token from `(ownerId, pin)` and match
//!   it against a ticket group's records
//! - [`VerificationService`] -- re-check a receipt against caller-supplied
//!   data and public key
//!
//! Signature verification and redemption are deliberately independent: a
//! receipt is never linked to the records written for it.

pub mod error;
pub mod issuance;
pub mod redemption;
pub mod verification;
pub mod writer;

pub use error::{CoreError, CoreResult};
pub use issuance::{IssuanceService, IssuedOrder};
pub use redemption::RedemptionService;
pub use verification::VerificationService;
pub use writer::{PendingWrites, PersistenceReport, RecordWriter, WriteOutcome};
