use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{OwnerId, TicketGroupId};

/// A single line of a buyer's order.
///
/// Immutable once hashed: any change after signing makes the receipt fail
/// verification. Unknown fields are rejected, since the signature covers only
/// the fields kept here and the buyer verifies the document they sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderItem {
    pub ticket_group_id: TicketGroupId,
    pub item_type: String,
    pub quantity: u32,
    pub owner_id: OwnerId,
}

impl OrderItem {
    pub fn new(
        ticket_group_id: impl Into<TicketGroupId>,
        item_type: impl Into<String>,
        quantity: u32,
        owner_id: impl Into<OwnerId>,
    ) -> Self {
        Self {
            ticket_group_id: ticket_group_id.into(),
            item_type: item_type.into(),
            quantity,
            owner_id: owner_id.into(),
        }
    }
}

/// Ordered sequence of [`OrderItem`]s.
///
/// Serializes as a bare JSON array so that the canonical bytes match what a
/// client sends as `data` and later presents as `originalData`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderPayload(Vec<OrderItem>);

impl OrderPayload {
    pub fn new(items: Vec<OrderItem>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check structural rules before the payload is hashed.
    ///
    /// Requires at least one item, non-empty identifiers and `quantity >= 1`.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.0.is_empty() {
            return Err(TypeError::EmptyOrder);
        }
        for (index, item) in self.0.iter().enumerate() {
            let reason = if item.ticket_group_id.is_empty() {
                "empty ticketGroupId"
            } else if item.owner_id.is_empty() {
                "empty ownerId"
            } else if item.quantity == 0 {
                "quantity must be at least 1"
            } else {
                continue;
            };
            return Err(TypeError::InvalidItem {
                index,
                reason: reason.into(),
            });
        }
        Ok(())
    }
}

impl From<Vec<OrderItem>> for OrderPayload {
    fn from(items: Vec<OrderItem>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a OrderPayload {
    type Item = &'a OrderItem;
    type IntoIter = std::slice::Iter<'a, OrderItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
