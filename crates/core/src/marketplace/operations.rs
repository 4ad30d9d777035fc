use chrono::Utc;
use uuid::Uuid;

use super::error::{DeliveryError, MessageError};
use super::types::{Delivery, DeliveryStatus, Message};

const VIN_LENGTH: usize = 17;
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Filters deliveries by requester, driver and status.
/// A `None` filter matches every delivery.
pub fn filter_deliveries(
    deliveries: &[Delivery],
    sales_user_id: Option<Uuid>,
    driver_id: Option<Uuid>,
    status: Option<DeliveryStatus>,
) -> Vec<&Delivery> {
    deliveries
        .iter()
        .filter(|delivery| {
            sales_user_id.is_none_or(|id| delivery.sales_user_id == id)
                && driver_id.is_none_or(|id| delivery.driver_id == Some(id))
                && status.is_none_or(|s| delivery.status == s)
        })
        .collect()
}

/// Validates a delivery before creation or update.
///
/// Only the VIN length is checked here; character-level VIN rules belong to
/// the form layer.
pub fn validate_delivery(delivery: &Delivery) -> Result<(), DeliveryError> {
    if delivery.vin.trim().chars().count() != VIN_LENGTH {
        return Err(DeliveryError::InvalidVinLength);
    }
    if delivery.pickup_address.trim().is_empty() {
        return Err(DeliveryError::EmptyPickupAddress);
    }
    if delivery.dropoff_address.trim().is_empty() {
        return Err(DeliveryError::EmptyDropoffAddress);
    }
    Ok(())
}

/// Validates a chat message before it is sent.
pub fn validate_message(message: &Message) -> Result<(), MessageError> {
    if message.body.trim().is_empty() {
        return Err(MessageError::EmptyBody);
    }
    if message.body.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(MessageError::BodyTooLong);
    }
    if message.sender_id == message.recipient_id {
        return Err(MessageError::SelfAddressed);
    }
    Ok(())
}

/// Moves a delivery to a new status, bumping `updated_at`.
pub fn transition_delivery(
    delivery: &mut Delivery,
    next: DeliveryStatus,
) -> Result<(), DeliveryError> {
    if !delivery.status.can_transition_to(next) {
        return Err(DeliveryError::InvalidTransition {
            from: delivery.status,
            to: next,
        });
    }
    delivery.status = next;
    delivery.updated_at = Utc::now();
    Ok(())
}

/// Assigns a driver to a requested delivery.
pub fn accept_delivery(delivery: &mut Delivery, driver_id: Uuid) -> Result<(), DeliveryError> {
    if delivery.driver_id.is_some_and(|id| id != driver_id) {
        return Err(DeliveryError::AlreadyAssigned);
    }
    transition_delivery(delivery, DeliveryStatus::Accepted)?;
    delivery.driver_id = Some(driver_id);
    Ok(())
}

/// Returns the other participant of a delivery's conversation.
///
/// Messages from the sales user go to the assigned driver and vice versa.
/// Before a driver accepts there is nobody to talk to.
pub fn counterpart_of(delivery: &Delivery, user_id: Uuid) -> Result<Uuid, DeliveryError> {
    match delivery.driver_id {
        Some(driver_id) if user_id == delivery.sales_user_id => Ok(driver_id),
        Some(driver_id) if user_id == driver_id => Ok(delivery.sales_user_id),
        _ => Err(DeliveryError::NotAParticipant(user_id.to_string())),
    }
}

/// Counts unread messages addressed to `recipient_id` in a slice of messages.
pub fn count_unread(messages: &[Message], delivery_id: Uuid, recipient_id: Uuid) -> u64 {
    messages
        .iter()
        .filter(|m| m.delivery_id == delivery_id && m.recipient_id == recipient_id && !m.read)
        .count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::types::DeliveryKind;

    const VIN: &str = "1HGCM82633A004352";

    fn delivery() -> Delivery {
        Delivery::new(
            Uuid::new_v4(),
            DeliveryKind::Delivery,
            VIN,
            "12 Lot Rd",
            "99 Main St",
        )
    }

    #[test]
    fn test_validate_delivery_ok() {
        assert_eq!(validate_delivery(&delivery()), Ok(()));
    }

    #[test]
    fn test_validate_delivery_vin_length() {
        let mut d = delivery();
        d.vin = "SHORT".to_string();
        assert_eq!(validate_delivery(&d), Err(DeliveryError::InvalidVinLength));
    }

    #[test]
    fn test_validate_delivery_addresses() {
        let mut d = delivery();
        d.pickup_address = "  ".to_string();
        assert_eq!(
            validate_delivery(&d),
            Err(DeliveryError::EmptyPickupAddress)
        );

        let mut d = delivery();
        d.dropoff_address = String::new();
        assert_eq!(
            validate_delivery(&d),
            Err(DeliveryError::EmptyDropoffAddress)
        );
    }

    #[test]
    fn test_validate_message() {
        let sender = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let ok = Message::new(Uuid::new_v4(), sender, recipient, "On my way");
        assert_eq!(validate_message(&ok), Ok(()));

        let empty = Message::new(Uuid::new_v4(), sender, recipient, "   ");
        assert_eq!(validate_message(&empty), Err(MessageError::EmptyBody));

        let long = Message::new(Uuid::new_v4(), sender, recipient, "x".repeat(2001));
        assert_eq!(validate_message(&long), Err(MessageError::BodyTooLong));

        let to_self = Message::new(Uuid::new_v4(), sender, sender, "hi me");
        assert_eq!(validate_message(&to_self), Err(MessageError::SelfAddressed));
    }

    #[test]
    fn test_accept_delivery() {
        let mut d = delivery();
        let driver = Uuid::new_v4();
        let before = d.updated_at;

        accept_delivery(&mut d, driver).unwrap();

        assert_eq!(d.status, DeliveryStatus::Accepted);
        assert_eq!(d.driver_id, Some(driver));
        assert!(d.updated_at >= before);
    }

    #[test]
    fn test_accept_delivery_twice_fails() {
        let mut d = delivery();
        accept_delivery(&mut d, Uuid::new_v4()).unwrap();

        let result = accept_delivery(&mut d, Uuid::new_v4());
        assert_eq!(result, Err(DeliveryError::AlreadyAssigned));
    }

    #[test]
    fn test_accept_cancelled_delivery_fails() {
        let mut d = delivery();
        transition_delivery(&mut d, DeliveryStatus::Cancelled).unwrap();

        let result = accept_delivery(&mut d, Uuid::new_v4());
        assert_eq!(
            result,
            Err(DeliveryError::InvalidTransition {
                from: DeliveryStatus::Cancelled,
                to: DeliveryStatus::Accepted,
            })
        );
        assert_eq!(d.driver_id, None);
    }

    #[test]
    fn test_transition_rejects_skipping() {
        let mut d = delivery();
        let result = transition_delivery(&mut d, DeliveryStatus::Delivered);
        assert!(result.is_err());
        assert_eq!(d.status, DeliveryStatus::Requested);
    }

    #[test]
    fn test_counterpart_of() {
        let mut d = delivery();
        let driver = Uuid::new_v4();

        assert!(counterpart_of(&d, d.sales_user_id).is_err());

        d.driver_id = Some(driver);
        assert_eq!(counterpart_of(&d, d.sales_user_id), Ok(driver));
        assert_eq!(counterpart_of(&d, driver), Ok(d.sales_user_id));
        assert!(counterpart_of(&d, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_filter_deliveries() {
        let driver = Uuid::new_v4();
        let mut accepted = delivery();
        accept_delivery(&mut accepted, driver).unwrap();
        let requested = delivery();
        let all = vec![accepted.clone(), requested.clone()];

        assert_eq!(filter_deliveries(&all, None, None, None).len(), 2);
        assert_eq!(
            filter_deliveries(&all, None, Some(driver), None)[0].id,
            accepted.id
        );
        assert_eq!(
            filter_deliveries(&all, None, None, Some(DeliveryStatus::Requested))[0].id,
            requested.id
        );
        assert_eq!(
            filter_deliveries(&all, Some(requested.sales_user_id), None, None).len(),
            1
        );
    }

    #[test]
    fn test_count_unread() {
        let delivery_id = Uuid::new_v4();
        let me = Uuid::new_v4();
        let them = Uuid::new_v4();
        let messages = vec![
            Message::new(delivery_id, them, me, "one"),
            Message::new(delivery_id, them, me, "two").mark_read(),
            Message::new(delivery_id, me, them, "three"),
            Message::new(Uuid::new_v4(), them, me, "elsewhere"),
            Message::new(delivery_id, them, me, "four"),
        ];

        assert_eq!(count_unread(&messages, delivery_id, me), 2);
        assert_eq!(count_unread(&messages, delivery_id, them), 1);
    }
}
