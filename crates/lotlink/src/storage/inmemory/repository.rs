//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use lotlink_core::marketplace::{
    filter_deliveries, Dealer, Delivery, DeliveryStatus, Driver, Message, SalesUser,
};
use lotlink_core::storage::{
    DealerRepository, DeliveryRepository, DriverRepository, MessageQuery, MessageRepository,
    RepositoryError, Result, SalesUserRepository,
};

/// In-memory storage backend.
///
/// Uses HashMaps wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    dealers: Arc<RwLock<HashMap<Uuid, Dealer>>>,
    sales_users: Arc<RwLock<HashMap<Uuid, SalesUser>>>,
    drivers: Arc<RwLock<HashMap<Uuid, Driver>>>,
    deliveries: Arc<RwLock<HashMap<Uuid, Delivery>>>,
    messages: Arc<RwLock<HashMap<Uuid, Message>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Inserts `row` unless `id` is taken.
fn insert_new<T: Clone>(
    rows: &mut HashMap<Uuid, T>,
    entity_type: &'static str,
    id: Uuid,
    row: &T,
) -> Result<()> {
    if rows.contains_key(&id) {
        return Err(RepositoryError::already_exists(entity_type, id));
    }
    rows.insert(id, row.clone());
    Ok(())
}

/// Replaces `row` if `id` exists.
fn replace_existing<T: Clone>(
    rows: &mut HashMap<Uuid, T>,
    entity_type: &'static str,
    id: Uuid,
    row: &T,
) -> Result<()> {
    match rows.get_mut(&id) {
        Some(existing) => {
            *existing = row.clone();
            Ok(())
        }
        None => Err(RepositoryError::not_found(entity_type, id)),
    }
}

#[async_trait]
impl DealerRepository for InMemoryRepository {
    async fn get_dealer(&self, id: Uuid) -> Result<Option<Dealer>> {
        let dealers = self.dealers.read().await;
        Ok(dealers.get(&id).cloned())
    }

    async fn list_dealers(&self) -> Result<Vec<Dealer>> {
        let dealers = self.dealers.read().await;
        let mut result: Vec<Dealer> = dealers.values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn create_dealer(&self, dealer: &Dealer) -> Result<()> {
        let mut dealers = self.dealers.write().await;
        insert_new(&mut dealers, "Dealer", dealer.id, dealer)
    }
}

#[async_trait]
impl SalesUserRepository for InMemoryRepository {
    async fn get_sales_user(&self, id: Uuid) -> Result<Option<SalesUser>> {
        let users = self.sales_users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn list_sales_users(&self, dealer_id: Option<Uuid>) -> Result<Vec<SalesUser>> {
        let users = self.sales_users.read().await;
        let mut result: Vec<SalesUser> = users
            .values()
            .filter(|u| dealer_id.is_none_or(|id| u.dealer_id == id))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn create_sales_user(&self, user: &SalesUser) -> Result<()> {
        let mut users = self.sales_users.write().await;
        insert_new(&mut users, "SalesUser", user.id, user)
    }
}

#[async_trait]
impl DriverRepository for InMemoryRepository {
    async fn get_driver(&self, id: Uuid) -> Result<Option<Driver>> {
        let drivers = self.drivers.read().await;
        Ok(drivers.get(&id).cloned())
    }

    async fn list_drivers(&self, available_only: bool) -> Result<Vec<Driver>> {
        let drivers = self.drivers.read().await;
        let mut result: Vec<Driver> = drivers
            .values()
            .filter(|d| !available_only || d.available)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn create_driver(&self, driver: &Driver) -> Result<()> {
        let mut drivers = self.drivers.write().await;
        insert_new(&mut drivers, "Driver", driver.id, driver)
    }

    async fn update_driver(&self, driver: &Driver) -> Result<()> {
        let mut drivers = self.drivers.write().await;
        replace_existing(&mut drivers, "Driver", driver.id, driver)
    }
}

#[async_trait]
impl DeliveryRepository for InMemoryRepository {
    async fn get_delivery(&self, id: Uuid) -> Result<Option<Delivery>> {
        let deliveries = self.deliveries.read().await;
        Ok(deliveries.get(&id).cloned())
    }

    async fn list_deliveries(
        &self,
        sales_user_id: Option<Uuid>,
        driver_id: Option<Uuid>,
        status: Option<DeliveryStatus>,
    ) -> Result<Vec<Delivery>> {
        let deliveries = self.deliveries.read().await;
        let all: Vec<Delivery> = deliveries.values().cloned().collect();
        let mut result: Vec<Delivery> = filter_deliveries(&all, sales_user_id, driver_id, status)
            .into_iter()
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn create_delivery(&self, delivery: &Delivery) -> Result<()> {
        let mut deliveries = self.deliveries.write().await;
        insert_new(&mut deliveries, "Delivery", delivery.id, delivery)
    }

    async fn update_delivery(&self, delivery: &Delivery) -> Result<()> {
        let mut deliveries = self.deliveries.write().await;
        replace_existing(&mut deliveries, "Delivery", delivery.id, delivery)
    }

    async fn update_delivery_if_unchanged(
        &self,
        current: &Delivery,
        updated: &Delivery,
    ) -> Result<bool> {
        let mut deliveries = self.deliveries.write().await;
        match deliveries.get_mut(&current.id) {
            Some(existing) if existing == current => {
                *existing = updated.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(RepositoryError::not_found("Delivery", current.id)),
        }
    }
}

#[async_trait]
impl MessageRepository for InMemoryRepository {
    async fn get_message(&self, id: Uuid) -> Result<Option<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.get(&id).cloned())
    }

    async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        let mut result: Vec<Message> = messages
            .values()
            .filter(|m| query.matches(m))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn count_messages(&self, query: &MessageQuery) -> Result<u64> {
        let messages = self.messages.read().await;
        Ok(messages.values().filter(|m| query.matches(m)).count() as u64)
    }

    async fn create_message(&self, message: &Message) -> Result<()> {
        let mut messages = self.messages.write().await;
        insert_new(&mut messages, "Message", message.id, message)
    }

    async fn update_message(&self, message: &Message) -> Result<()> {
        let mut messages = self.messages.write().await;
        replace_existing(&mut messages, "Message", message.id, message)
    }
}
