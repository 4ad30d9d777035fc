//! Pretty output formatting.

use lotlink_core::marketplace::{Dealer, Delivery, Driver, Message, SalesUser};
use lotlink_core::realtime::{ChangeEvent, Record};
use lotlink_core::unread::UnreadSnapshot;

/// Format a list with a header, or an empty notice.
fn format_list<T>(title: &str, items: &[T], format_item: fn(&T) -> String) -> String {
    if items.is_empty() {
        return format!("No {} found.", title.to_lowercase());
    }
    let mut output = format!("{} ({})\n", title, items.len());
    output.push_str(&"-".repeat(40));
    for item in items {
        output.push_str(&format!("\n{}", format_item(item)));
        output.push('\n');
    }
    output
}

/// Format a dealer for display.
pub fn format_dealer(dealer: &Dealer) -> String {
    let mut output = format!("{}\n  ID: {}", dealer.name, dealer.id);
    if let Some(address) = &dealer.address {
        output.push_str(&format!("\n  Address: {}", address));
    }
    output
}

/// Format dealers for display.
pub fn format_dealers(dealers: &[Dealer]) -> String {
    format_list("DEALERS", dealers, format_dealer)
}

/// Format a sales user for display.
pub fn format_sales_user(user: &SalesUser) -> String {
    let mut output = format!(
        "{}\n  ID: {}\n  Dealer: {}\n  Email: {}",
        user.name, user.id, user.dealer_id, user.email
    );
    if let Some(phone) = &user.phone {
        output.push_str(&format!("\n  Phone: {}", phone));
    }
    output
}

/// Format sales users for display.
pub fn format_sales_users(users: &[SalesUser]) -> String {
    format_list("SALES USERS", users, format_sales_user)
}

/// Format a driver for display.
pub fn format_driver(driver: &Driver) -> String {
    let availability = if driver.available {
        "available"
    } else {
        "unavailable"
    };
    let mut output = format!(
        "{} [{}]\n  ID: {}\n  Email: {}",
        driver.name, availability, driver.id, driver.email
    );
    if let Some(phone) = &driver.phone {
        output.push_str(&format!("\n  Phone: {}", phone));
    }
    output
}

/// Format drivers for display.
pub fn format_drivers(drivers: &[Driver]) -> String {
    format_list("DRIVERS", drivers, format_driver)
}

/// Format a delivery for display.
pub fn format_delivery(delivery: &Delivery) -> String {
    let mut output = format!(
        "{} {} [{}]\n  ID: {}\n  From: {}\n  To: {}\n  Requested by: {}",
        delivery.kind.as_str(),
        delivery.vin,
        delivery.status,
        delivery.id,
        delivery.pickup_address,
        delivery.dropoff_address,
        delivery.sales_user_id
    );
    if let Some(driver_id) = delivery.driver_id {
        output.push_str(&format!("\n  Driver: {}", driver_id));
    }
    if let Some(notes) = &delivery.notes {
        output.push_str(&format!("\n  Notes: {}", notes));
    }
    output
}

/// Format deliveries for display.
pub fn format_deliveries(deliveries: &[Delivery]) -> String {
    format_list("DELIVERIES", deliveries, format_delivery)
}

/// Format a message as one chat line.
pub fn format_message(message: &Message) -> String {
    let marker = if message.read { " " } else { "*" };
    format!(
        "{} [{}] {} -> {}: {}",
        marker,
        message.created_at.format("%Y-%m-%d %H:%M"),
        message.sender_id,
        message.recipient_id,
        message.body
    )
}

/// Format a conversation for display.
pub fn format_messages(messages: &[Message]) -> String {
    format_list("MESSAGES", messages, format_message)
}

/// Format a change event as one line.
pub fn format_change(event: &ChangeEvent) -> String {
    let detail = match &event.record {
        Record::Message(message) => format!("message {}: {}", message.id, message.body),
        Record::Delivery(delivery) => format!("delivery {} is {}", delivery.id, delivery.status),
    };
    format!("{} {}", event.kind.as_str(), detail)
}

/// Format an unread snapshot as one line.
pub fn format_unread(snapshot: &UnreadSnapshot) -> String {
    match snapshot.binding {
        Some(binding) => format!(
            "{} unread for {} on {}",
            snapshot.count, binding.user_id, binding.conversation_id
        ),
        None => "inactive".to_string(),
    }
}
