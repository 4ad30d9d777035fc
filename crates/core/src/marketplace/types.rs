use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vehicle dealership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dealer {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
}

impl Dealer {
    /// Creates a new dealer with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: None,
        }
    }

    /// Sets the street address for this dealer.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets a specific ID for this dealer (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A member of a dealership's sales staff who requests deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesUser {
    pub id: Uuid,
    pub dealer_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl SalesUser {
    /// Creates a new sales user working for the given dealer.
    pub fn new(dealer_id: Uuid, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            dealer_id,
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    /// Sets the phone number for this sales user.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets a specific ID for this sales user (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// An independent driver who accepts and fulfills deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Whether the driver is currently taking new jobs.
    pub available: bool,
}

impl Driver {
    /// Creates a new available driver.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            phone: None,
            available: true,
        }
    }

    /// Sets the phone number for this driver.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets a specific ID for this driver (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// What the sales user is asking the driver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryKind {
    /// Move a vehicle from the lot to a customer.
    Delivery,
    /// Exchange a vehicle with another dealership.
    Swap,
}

impl DeliveryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryKind::Delivery => "delivery",
            DeliveryKind::Swap => "swap",
        }
    }
}

/// Lifecycle of a delivery job.
///
/// ```text
/// Requested -> Accepted -> InTransit -> Delivered
///     |            |
///     +------------+----> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Requested,
    Accepted,
    InTransit,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    /// Returns true if a delivery in this status may move to `next`.
    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, next),
            (Requested, Accepted)
                | (Accepted, InTransit)
                | (InTransit, Delivered)
                | (Requested, Cancelled)
                | (Accepted, Cancelled)
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Requested => "requested",
            DeliveryStatus::Accepted => "accepted",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "requested" => Ok(DeliveryStatus::Requested),
            "accepted" => Ok(DeliveryStatus::Accepted),
            "in_transit" => Ok(DeliveryStatus::InTransit),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "cancelled" => Ok(DeliveryStatus::Cancelled),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

/// A delivery or swap job. Its id also identifies the chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    /// The sales user who requested the job.
    pub sales_user_id: Uuid,
    /// The driver who accepted the job, if any.
    pub driver_id: Option<Uuid>,
    pub kind: DeliveryKind,
    pub vin: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    pub notes: Option<String>,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Delivery {
    /// Creates a new requested delivery.
    pub fn new(
        sales_user_id: Uuid,
        kind: DeliveryKind,
        vin: impl Into<String>,
        pickup_address: impl Into<String>,
        dropoff_address: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sales_user_id,
            driver_id: None,
            kind,
            vin: vin.into(),
            pickup_address: pickup_address.into(),
            dropoff_address: dropoff_address.into(),
            notes: None,
            status: DeliveryStatus::Requested,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the notes for this delivery.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets a specific ID for this delivery (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Returns true if the user is one of the two chat participants.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.sales_user_id == user_id || self.driver_id == Some(user_id)
    }
}

/// A chat message on a delivery's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// The delivery (conversation) this message belongs to.
    pub delivery_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new unread message.
    pub fn new(
        delivery_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            delivery_id,
            sender_id,
            recipient_id,
            body: body.into(),
            read: false,
            created_at: Utc::now(),
        }
    }

    /// Sets a specific ID for this message (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Marks the message as read.
    pub fn mark_read(mut self) -> Self {
        self.read = true;
        self
    }
}
