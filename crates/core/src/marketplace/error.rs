use thiserror::Error;

use super::types::DeliveryStatus;

/// Errors that can occur when validating or manipulating deliveries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("VIN must be exactly 17 characters")]
    InvalidVinLength,
    #[error("Pickup address cannot be empty")]
    EmptyPickupAddress,
    #[error("Drop-off address cannot be empty")]
    EmptyDropoffAddress,
    #[error("Cannot move delivery from {from} to {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
    #[error("Delivery is already taken by another driver")]
    AlreadyAssigned,
    #[error("User {0} is not part of this delivery")]
    NotAParticipant(String),
}

/// Errors that can occur when validating chat messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("Message body cannot be empty")]
    EmptyBody,
    #[error("Message body too long (max 2000 characters)")]
    BodyTooLong,
    #[error("Sender and recipient must be different users")]
    SelfAddressed,
}
