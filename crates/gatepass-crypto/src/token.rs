use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use gatepass_types::{OwnerId, RedemptionToken};
use sha2::{Digest as _, Sha256};
use subtle::ConstantTimeEq;

/// Derives one-way redemption tokens from `(ownerId, pin)`.
///
/// Both fields are length-prefixed (u64 big-endian) under a domain tag before
/// hashing, so `("ab", "1")` and `("a", "b1")` never collide. The output is
/// stable across processes and restarts.
pub struct RedemptionTokenCodec;

impl RedemptionTokenCodec {
    const DOMAIN: &'static [u8] = b"gatepass-redemption-v1:";

    /// Derive the token for an owner and PIN.
    pub fn derive(owner_id: &OwnerId, pin: &str) -> RedemptionToken {
        let mut hasher = Sha256::new();
        hasher.update(Self::DOMAIN);
        for field in [owner_id.as_str().as_bytes(), pin.as_bytes()] {
            hasher.update((field.len() as u64).to_be_bytes());
            hasher.update(field);
        }
        RedemptionToken::from_encoded(STANDARD.encode(hasher.finalize()))
    }

    /// Recompute the token for `(owner_id, pin)` and compare it with `stored`
    /// in constant time.
    pub fn matches(stored: &RedemptionToken, owner_id: &OwnerId, pin: &str) -> bool {
        let candidate = Self::derive(owner_id, pin);
        candidate.as_bytes().ct_eq(stored.as_bytes()).into()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn derive_is_deterministic() {
        let owner = OwnerId::new("u1");
        assert_eq!(
            RedemptionTokenCodec::derive(&owner, "1234"),
            RedemptionTokenCodec::derive(&owner, "1234")
        );
    }

    #[test]
    fn token_is_base64_sha256() {
        let token = RedemptionTokenCodec::derive(&OwnerId::new("u1"), "1234");
        let raw = STANDARD.decode(token.as_str()).unwrap();
        assert_eq!(raw.len(), 32);
    }

    #[test]
    fn concatenation_is_unambiguous() {
        let a = RedemptionTokenCodec::derive(&OwnerId::new("ab"), "1");
        let b = RedemptionTokenCodec::derive(&OwnerId::new("a"), "b1");
        assert_ne!(a, b);
    }

    #[test]
    fn matches_accepts_right_pin_only() {
        let owner = OwnerId::new("u1");
        let stored = RedemptionTokenCodec::derive(&owner, "1234");
        assert!(RedemptionTokenCodec::matches(&stored, &owner, "1234"));
        assert!(!RedemptionTokenCodec::matches(&stored, &owner, "9999"));
        assert!(!RedemptionTokenCodec::matches(&stored, &OwnerId::new("u2"), "1234"));
    }

    #[test]
    fn matches_rejects_malformed_stored_token() {
        let owner = OwnerId::new("u1");
        let stored = RedemptionToken::from_encoded("short");
        assert!(!RedemptionTokenCodec::matches(&stored, &owner, "1234"));
    }

    proptest! {
        #[test]
        fn same_inputs_same_token(owner in ".{0,32}", pin in "[0-9]{4,8}") {
            let owner = OwnerId::new(owner);
            prop_assert_eq!(
                RedemptionTokenCodec::derive(&owner, &pin),
                RedemptionTokenCodec::derive(&owner, &pin)
            );
        }

        #[test]
        fn different_pins_different_tokens(
            owner in "[a-z0-9]{1,16}",
            pin_a in "[0-9]{4,8}",
            pin_b in "[0-9]{4,8}",
        ) {
            prop_assume!(pin_a != pin_b);
            let owner = OwnerId::new(owner);
            prop_assert_ne!(
                RedemptionTokenCodec::derive(&owner, &pin_a),
                RedemptionTokenCodec::derive(&owner, &pin_b)
            );
        }

        #[test]
        fn split_point_changes_token(joined in "[a-z0-9]{2,24}", split in 1usize..23) {
            prop_assume!(split < joined.len());
            let (left, right) = joined.split_at(split);
            let whole = RedemptionTokenCodec::derive(&OwnerId::new(joined.clone()), "");
            let parts = RedemptionTokenCodec::derive(&OwnerId::new(left), right);
            prop_assert_ne!(whole, parts);
        }
    }
}
