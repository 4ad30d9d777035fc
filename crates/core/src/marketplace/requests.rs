//! API request types for marketplace operations.
//!
//! These types are shared between the server and client for type-safe API communication.
//! Following the Functional Core pattern, these are pure data types with no I/O.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::serde::{deserialize_optional_bool, deserialize_optional_string, deserialize_optional_uuid};

use super::types::{Dealer, Delivery, DeliveryKind, DeliveryStatus, Driver, Message, SalesUser};

/// Request payload for registering a dealership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDealerRequest {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
}

impl CreateDealerRequest {
    /// Convert into a Dealer.
    pub fn into_dealer(self) -> Dealer {
        let mut dealer = Dealer::new(self.name.trim());
        if let Some(address) = self.address {
            dealer = dealer.with_address(address);
        }
        dealer
    }
}

/// Request payload for adding a sales user to a dealership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSalesUserRequest {
    pub dealer_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
}

impl CreateSalesUserRequest {
    /// Convert into a SalesUser.
    pub fn into_sales_user(self) -> SalesUser {
        let mut user = SalesUser::new(self.dealer_id, self.name.trim(), self.email.trim());
        if let Some(phone) = self.phone {
            user = user.with_phone(phone);
        }
        user
    }
}

/// Request payload for signing up a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub email: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
}

impl CreateDriverRequest {
    /// Convert into a Driver.
    pub fn into_driver(self) -> Driver {
        let mut driver = Driver::new(self.name.trim(), self.email.trim());
        if let Some(phone) = self.phone {
            driver = driver.with_phone(phone);
        }
        driver
    }
}

/// Request payload for updating a driver's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDriverRequest {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub available: Option<bool>,
}

impl UpdateDriverRequest {
    /// Apply updates to an existing driver.
    pub fn apply_to(self, driver: &mut Driver) {
        if let Some(phone) = self.phone {
            driver.phone = Some(phone);
        }
        if let Some(available) = self.available {
            driver.available = available;
        }
    }
}

/// Request payload for requesting a delivery or swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeliveryRequest {
    pub sales_user_id: Uuid,
    pub kind: DeliveryKind,
    pub vin: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
}

impl CreateDeliveryRequest {
    /// Convert into a requested Delivery. VINs are normalized to upper case.
    pub fn into_delivery(self) -> Delivery {
        let mut delivery = Delivery::new(
            self.sales_user_id,
            self.kind,
            self.vin.trim().to_uppercase(),
            self.pickup_address.trim(),
            self.dropoff_address.trim(),
        );
        if let Some(notes) = self.notes {
            delivery = delivery.with_notes(notes);
        }
        delivery
    }
}

/// Request payload for editing the details of a delivery.
///
/// Status changes go through dedicated endpoints so the lifecycle rules apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDeliveryRequest {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub pickup_address: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub dropoff_address: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
}

impl UpdateDeliveryRequest {
    /// Apply updates to an existing delivery, bumping `updated_at`.
    pub fn apply_to(self, delivery: &mut Delivery) {
        if let Some(pickup) = self.pickup_address {
            delivery.pickup_address = pickup;
        }
        if let Some(dropoff) = self.dropoff_address {
            delivery.dropoff_address = dropoff;
        }
        if let Some(notes) = self.notes {
            delivery.notes = Some(notes);
        }
        delivery.updated_at = chrono::Utc::now();
    }
}

/// Request payload for a driver accepting a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptDeliveryRequest {
    pub driver_id: Uuid,
}

/// Request payload for moving a delivery along its lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: DeliveryStatus,
}

/// Request payload for sending a chat message on a delivery.
///
/// When `recipient_id` is omitted the server addresses the message to the
/// other participant of the delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_uuid",
        skip_serializing_if = "Option::is_none"
    )]
    pub recipient_id: Option<Uuid>,
    pub body: String,
}

impl SendMessageRequest {
    /// Convert into an unread Message once the recipient is known.
    pub fn into_message(self, delivery_id: Uuid, recipient_id: Uuid) -> Message {
        Message::new(delivery_id, self.sender_id, recipient_id, self.body)
    }
}

/// Request payload for marking every message addressed to a user as read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub recipient_id: Uuid,
}

/// Query parameters for listing deliveries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDeliveriesQuery {
    #[serde(
        default,
        deserialize_with = "deserialize_optional_uuid",
        skip_serializing_if = "Option::is_none"
    )]
    pub sales_user_id: Option<Uuid>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_uuid",
        skip_serializing_if = "Option::is_none"
    )]
    pub driver_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
}
