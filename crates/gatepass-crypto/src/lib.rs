//! Cryptographic primitives for Gatepass.
//!
//! Provides canonical SHA-256 hashing of order payloads, per-order RSA
//! keypairs with PKCS#1 v1.5 signing/verification, and one-way redemption
//! token derivation.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod hasher;
pub mod signer;
pub mod token;

pub use hasher::{CanonicalHasher, HasherError};
pub use signer::{Signature, SignatureError, SignatureService, SigningKeypair, MIN_MODULUS_BITS};
pub use token::RedemptionTokenCodec;
