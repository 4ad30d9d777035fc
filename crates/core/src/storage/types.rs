use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::marketplace::Message;

/// Filter for reading or counting chat messages.
///
/// Every `None` field matches all rows, so the default query selects every
/// message in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
}

impl MessageQuery {
    /// All messages in one conversation.
    pub fn conversation(delivery_id: Uuid) -> Self {
        Self {
            delivery_id: Some(delivery_id),
            ..Self::default()
        }
    }

    /// Unread messages addressed to `recipient_id` in one conversation.
    pub fn unread_for(delivery_id: Uuid, recipient_id: Uuid) -> Self {
        Self {
            delivery_id: Some(delivery_id),
            recipient_id: Some(recipient_id),
            read: Some(false),
        }
    }

    /// Returns true if the message satisfies every filter.
    pub fn matches(&self, message: &Message) -> bool {
        self.delivery_id.is_none_or(|id| message.delivery_id == id)
            && self.recipient_id.is_none_or(|id| message.recipient_id == id)
            && self.read.is_none_or(|read| message.read == read)
    }
}

/// Body returned by counted reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}
