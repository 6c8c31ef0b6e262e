use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{OwnerId, TicketGroupId};
use crate::order::OrderItem;

/// Identifier of a single persisted redemption record (UUID v7, time-ordered).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a new time-ordered record ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One-way token derived from `(ownerId, pin)`, base64 encoded.
///
/// The PIN itself is never stored; only this token is.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedemptionToken(String);

impl RedemptionToken {
    /// Wrap an already-encoded token.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for RedemptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedemptionToken(<redacted>)")
    }
}

/// Append-only record created once per order item at issuance.
///
/// Records are never mutated and never consumed; a record may be matched any
/// number of times at the gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub record_id: RecordId,
    pub ticket_group_id: TicketGroupId,
    pub owner_id: OwnerId,
    pub item_type: String,
    pub quantity: u32,
    pub issued_at: DateTime<Utc>,
    pub redemption_token: RedemptionToken,
}

impl RedemptionRecord {
    /// Build the record for an order item, stamped with the current time.
    pub fn for_item(item: &OrderItem, redemption_token: RedemptionToken) -> Self {
        Self {
            record_id: RecordId::new(),
            ticket_group_id: item.ticket_group_id.clone(),
            owner_id: item.owner_id.clone(),
            item_type: item.item_type.clone(),
            quantity: item.quantity,
            issued_at: Utc::now(),
            redemption_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_copies_item_fields() {
        let item = OrderItem::new("g1", "paddock", 2, "u2");
        let record = RedemptionRecord::for_item(&item, RedemptionToken::from_encoded("dG9r"));
        assert_eq!(record.ticket_group_id.as_str(), "g1");
        assert_eq!(record.owner_id.as_str(), "u2");
        assert_eq!(record.item_type, "paddock");
        assert_eq!(record.quantity, 2);
        assert_eq!(record.redemption_token.as_str(), "dG9r");
    }

    #[test]
    fn record_ids_are_unique() {
        assert_ne!(RecordId::new(), RecordId::new());
    }

    #[test]
    fn record_serde_roundtrip() {
        let item = OrderItem::new("g1", "ga", 1, "u1");
        let record = RedemptionRecord::for_item(&item, RedemptionToken::from_encoded("abc="));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"redemptionToken\":\"abc=\""));
        let parsed: RedemptionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = RedemptionToken::from_encoded("secret-ish");
        assert!(!format!("{token:?}").contains("secret-ish"));
    }
}
