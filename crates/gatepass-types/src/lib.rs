//! Foundation types for Gatepass.
//!
//! This crate provides the value types shared by every other Gatepass crate:
//! the order a buyer submits, the receipt they get back, and the redemption
//! records persisted per ticket group.
//!
//! # Key Types
//!
//! - [`OrderPayload`] / [`OrderItem`] -- the buyer's order, hashed and signed at issuance
//! - [`SignedReceipt`] -- `{publicKey, digitalSignature}` handed back to the buyer
//! - [`RedemptionRecord`] -- append-only per-item record stored under a ticket group
//! - [`RedemptionToken`] -- one-way token proving knowledge of a PIN
//! - [`Digest`] -- 32-byte SHA-256 output of the canonical hasher
//! - [`TicketGroupId`] / [`OwnerId`] -- string identifiers with distinct types

pub mod digest;
pub mod error;
pub mod identity;
pub mod order;
pub mod receipt;
pub mod record;

pub use digest::Digest;
pub use error::TypeError;
pub use identity::{OwnerId, TicketGroupId};
pub use order::{OrderItem, OrderPayload};
pub use receipt::SignedReceipt;
pub use record::{RecordId, RedemptionRecord, RedemptionToken};
