use chrono::{Duration, Utc};
use uuid::Uuid;

use lotlink_core::marketplace::{
    accept_delivery, transition_delivery, Dealer, Delivery, DeliveryKind, DeliveryStatus, Driver,
    Message, SalesUser,
};

use crate::state::AppState;

/// Fixed ids so the demo rows can be addressed from the CLI across restarts.
pub const DEMO_DEALER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);
pub const DEMO_SALES_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0101);
pub const DEMO_DRIVER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0201);
pub const DEMO_DELIVERY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0301);

/// Rows inserted by [`seed`].
#[derive(Debug, Clone)]
pub struct DemoData {
    pub dealers: Vec<Dealer>,
    pub sales_users: Vec<SalesUser>,
    pub drivers: Vec<Driver>,
    pub deliveries: Vec<Delivery>,
    pub messages: Vec<Message>,
}

/// Generates a small marketplace: one dealer, one sales user, two drivers,
/// an accepted delivery with a short chat, and an open swap request.
pub fn generate_demo_data() -> DemoData {
    let dealer = Dealer::new("Harbor City Auto")
        .with_address("500 Harbor Blvd")
        .with_id(DEMO_DEALER_ID);

    let sales_user = SalesUser::new(dealer.id, "Maya Chen", "maya@harborcityauto.test")
        .with_phone("555-0142")
        .with_id(DEMO_SALES_USER_ID);

    let driver = Driver::new("Luis Ortega", "luis@drivers.test")
        .with_phone("555-0188")
        .with_id(DEMO_DRIVER_ID);
    let mut off_shift = Driver::new("Priya Nair", "priya@drivers.test");
    off_shift.available = false;

    let now = Utc::now();

    let mut delivery = Delivery::new(
        sales_user.id,
        DeliveryKind::Delivery,
        "1HGCM82633A004352",
        "500 Harbor Blvd",
        "18 Willow Lane",
    )
    .with_notes("Customer prefers afternoon drop-off")
    .with_id(DEMO_DELIVERY_ID);
    delivery.created_at = now - Duration::hours(2);
    // Demo rows are built from valid states, so these cannot fail.
    let _ = accept_delivery(&mut delivery, driver.id);
    let _ = transition_delivery(&mut delivery, DeliveryStatus::InTransit);

    let mut swap = Delivery::new(
        sales_user.id,
        DeliveryKind::Swap,
        "2T1BURHE0JC034461",
        "500 Harbor Blvd",
        "77 Ridge Road",
    );
    swap.created_at = now - Duration::minutes(30);

    let mut messages = Vec::new();
    let mut push = |sender: Uuid, recipient: Uuid, body: &str, minutes_ago: i64, read: bool| {
        let mut message = Message::new(delivery.id, sender, recipient, body);
        message.created_at = now - Duration::minutes(minutes_ago);
        message.read = read;
        messages.push(message);
    };
    push(sales_user.id, driver.id, "Keys are at the front desk.", 90, true);
    push(driver.id, sales_user.id, "Got them, heading out now.", 80, true);
    push(sales_user.id, driver.id, "Customer asked for a call 10 minutes out.", 20, false);
    push(sales_user.id, driver.id, "Gate code is 4411.", 15, false);

    DemoData {
        dealers: vec![dealer],
        sales_users: vec![sales_user],
        drivers: vec![driver, off_shift],
        deliveries: vec![delivery, swap],
        messages,
    }
}

/// Inserts the demo rows through the state's repositories.
pub async fn seed(state: &AppState) -> anyhow::Result<()> {
    let data = generate_demo_data();

    for dealer in &data.dealers {
        state.dealer_repo.create_dealer(dealer).await?;
    }
    for user in &data.sales_users {
        state.sales_user_repo.create_sales_user(user).await?;
    }
    for driver in &data.drivers {
        state.driver_repo.create_driver(driver).await?;
    }
    for delivery in &data.deliveries {
        state.delivery_repo.create_delivery(delivery).await?;
    }
    for message in &data.messages {
        state.message_repo.create_message(message).await?;
    }

    tracing::info!(
        dealers = data.dealers.len(),
        drivers = data.drivers.len(),
        deliveries = data.deliveries.len(),
        messages = data.messages.len(),
        "Seeded demo data"
    );
    Ok(())
}
