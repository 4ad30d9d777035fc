use async_trait::async_trait;
use uuid::Uuid;

use crate::marketplace::{Dealer, Delivery, DeliveryStatus, Driver, Message, SalesUser};

use super::{MessageQuery, Result};

/// Repository for dealership operations.
#[async_trait]
pub trait DealerRepository: Send + Sync {
    /// Gets a dealer by its ID.
    async fn get_dealer(&self, id: Uuid) -> Result<Option<Dealer>>;

    /// Lists all dealers.
    async fn list_dealers(&self) -> Result<Vec<Dealer>>;

    /// Creates a new dealer.
    async fn create_dealer(&self, dealer: &Dealer) -> Result<()>;
}

/// Repository for sales staff operations.
#[async_trait]
pub trait SalesUserRepository: Send + Sync {
    /// Gets a sales user by their ID.
    async fn get_sales_user(&self, id: Uuid) -> Result<Option<SalesUser>>;

    /// Lists sales users, optionally restricted to one dealer.
    async fn list_sales_users(&self, dealer_id: Option<Uuid>) -> Result<Vec<SalesUser>>;

    /// Creates a new sales user.
    async fn create_sales_user(&self, user: &SalesUser) -> Result<()>;
}

/// Repository for driver operations.
#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// Gets a driver by their ID.
    async fn get_driver(&self, id: Uuid) -> Result<Option<Driver>>;

    /// Lists drivers, optionally only those taking new jobs.
    async fn list_drivers(&self, available_only: bool) -> Result<Vec<Driver>>;

    /// Creates a new driver.
    async fn create_driver(&self, driver: &Driver) -> Result<()>;

    /// Updates an existing driver.
    async fn update_driver(&self, driver: &Driver) -> Result<()>;
}

/// Repository for delivery operations.
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    /// Gets a delivery by its ID.
    async fn get_delivery(&self, id: Uuid) -> Result<Option<Delivery>>;

    /// Lists deliveries matching the filters, newest first.
    async fn list_deliveries(
        &self,
        sales_user_id: Option<Uuid>,
        driver_id: Option<Uuid>,
        status: Option<DeliveryStatus>,
    ) -> Result<Vec<Delivery>>;

    /// Creates a new delivery.
    async fn create_delivery(&self, delivery: &Delivery) -> Result<()>;

    /// Updates an existing delivery.
    async fn update_delivery(&self, delivery: &Delivery) -> Result<()>;

    /// Replaces the stored row with `updated` only if it still equals
    /// `current`, checked and written in one step.
    ///
    /// Returns `false` when another write got there first; nothing is
    /// written in that case.
    async fn update_delivery_if_unchanged(
        &self,
        current: &Delivery,
        updated: &Delivery,
    ) -> Result<bool>;
}

/// Repository for chat message operations.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Gets a message by its ID.
    async fn get_message(&self, id: Uuid) -> Result<Option<Message>>;

    /// Lists messages matching the query, oldest first.
    async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>>;

    /// Counts messages matching the query without returning them.
    async fn count_messages(&self, query: &MessageQuery) -> Result<u64>;

    /// Creates a new message.
    async fn create_message(&self, message: &Message) -> Result<()>;

    /// Updates an existing message.
    async fn update_message(&self, message: &Message) -> Result<()>;
}
