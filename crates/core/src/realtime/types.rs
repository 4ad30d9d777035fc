use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::marketplace::{Delivery, Message};

/// Tables whose row changes are streamed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Deliveries,
    Messages,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Deliveries => "deliveries",
            Table::Messages => "messages",
        }
    }
}

/// The kind of row-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
}

impl ChangeKind {
    /// SSE event name for this kind of change.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
        }
    }
}

/// The row as it looks after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "row", rename_all = "snake_case")]
pub enum Record {
    Delivery(Delivery),
    Message(Message),
}

/// A row-level change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    /// The delivery the changed row belongs to.
    pub conversation_id: Uuid,
    pub record: Record,
}

impl ChangeEvent {
    /// Creates an insert event for a new message.
    pub fn message_inserted(message: Message) -> Self {
        Self {
            table: Table::Messages,
            kind: ChangeKind::Insert,
            conversation_id: message.delivery_id,
            record: Record::Message(message),
        }
    }

    /// Creates an update event for a changed message (e.g. a read receipt).
    pub fn message_updated(message: Message) -> Self {
        Self {
            table: Table::Messages,
            kind: ChangeKind::Update,
            conversation_id: message.delivery_id,
            record: Record::Message(message),
        }
    }

    /// Creates an insert event for a new delivery.
    pub fn delivery_inserted(delivery: Delivery) -> Self {
        Self {
            table: Table::Deliveries,
            kind: ChangeKind::Insert,
            conversation_id: delivery.id,
            record: Record::Delivery(delivery),
        }
    }

    /// Creates an update event for a changed delivery.
    pub fn delivery_updated(delivery: Delivery) -> Self {
        Self {
            table: Table::Deliveries,
            kind: ChangeKind::Update,
            conversation_id: delivery.id,
            record: Record::Delivery(delivery),
        }
    }

    /// The recipient of the changed message, if the row is a message.
    pub fn recipient_id(&self) -> Option<Uuid> {
        match &self.record {
            Record::Message(message) => Some(message.recipient_id),
            Record::Delivery(_) => None,
        }
    }

    /// The filter a subscriber must hold to receive this event.
    pub fn filter(&self) -> ChangeFilter {
        ChangeFilter {
            table: self.table,
            conversation_id: self.conversation_id,
        }
    }
}

/// Selects the change events of one table within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeFilter {
    pub table: Table,
    pub conversation_id: Uuid,
}

impl ChangeFilter {
    /// Message changes on a delivery's chat.
    pub fn messages(conversation_id: Uuid) -> Self {
        Self {
            table: Table::Messages,
            conversation_id,
        }
    }

    /// Changes to the delivery row itself.
    pub fn deliveries(conversation_id: Uuid) -> Self {
        Self {
            table: Table::Deliveries,
            conversation_id,
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        self.table == event.table && self.conversation_id == event.conversation_id
    }
}
