//! Pure functions for mapping storage and domain errors to HTTP status codes.
//!
//! Following the Functional Core pattern, these are pure functions with no side
//! effects. The service decides what body to send; these only pick the code.

use crate::marketplace::{DeliveryError, MessageError};

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `AlreadyExists` -> 409 (Conflict)
/// - `ConnectionFailed` -> 503 (Service Unavailable)
/// - `QueryFailed` / `Serialization` -> 500 (Internal Server Error)
/// - `InvalidData` -> 400 (Bad Request)
///
/// # Examples
///
/// ```
/// use lotlink_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Delivery",
///     id: "abc-123".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::AlreadyExists { .. } => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) | RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}

/// Maps a [`DeliveryError`] to an HTTP status code.
///
/// Lifecycle conflicts are 409 so the caller can refresh and retry by hand;
/// field problems are 400.
pub fn delivery_error_to_status_code(error: &DeliveryError) -> u16 {
    match error {
        DeliveryError::InvalidVinLength
        | DeliveryError::EmptyPickupAddress
        | DeliveryError::EmptyDropoffAddress => 400,
        DeliveryError::InvalidTransition { .. } | DeliveryError::AlreadyAssigned => 409,
        DeliveryError::NotAParticipant(_) => 403,
    }
}

/// Maps a [`MessageError`] to an HTTP status code. Every variant is a bad request.
pub fn message_error_to_status_code(_error: &MessageError) -> u16 {
    400
}
