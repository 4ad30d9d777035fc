//! Delivery repository decorator that publishes change events.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use lotlink_core::marketplace::{Delivery, DeliveryStatus};
use lotlink_core::realtime::{ChangeEvent, ChangePublisher};
use lotlink_core::storage::{DeliveryRepository, Result};

/// Publishing delivery repository decorator.
///
/// - **Reads**: passed straight through to the wrapped repository
/// - **Writes**: persist first, then publish an insert/update event on the
///   delivery's own conversation
///
/// A failed publish is logged and does not fail the write.
pub struct PublishingDeliveryRepository<R, P>
where
    R: DeliveryRepository,
    P: ChangePublisher + ?Sized,
{
    repository: Arc<R>,
    publisher: Arc<P>,
}

impl<R, P> PublishingDeliveryRepository<R, P>
where
    R: DeliveryRepository,
    P: ChangePublisher + ?Sized,
{
    pub fn new(repository: Arc<R>, publisher: Arc<P>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    async fn publish(&self, event: ChangeEvent, delivery_id: Uuid) {
        if let Err(err) = self.publisher.publish(&event).await {
            tracing::warn!(
                delivery_id = %delivery_id,
                kind = event.kind.as_str(),
                error = %err,
                "Failed to publish delivery change"
            );
        }
    }
}

#[async_trait]
impl<R, P> DeliveryRepository for PublishingDeliveryRepository<R, P>
where
    R: DeliveryRepository + 'static,
    P: ChangePublisher + ?Sized + 'static,
{
    async fn get_delivery(&self, id: Uuid) -> Result<Option<Delivery>> {
        self.repository.get_delivery(id).await
    }

    async fn list_deliveries(
        &self,
        sales_user_id: Option<Uuid>,
        driver_id: Option<Uuid>,
        status: Option<DeliveryStatus>,
    ) -> Result<Vec<Delivery>> {
        self.repository
            .list_deliveries(sales_user_id, driver_id, status)
            .await
    }

    async fn create_delivery(&self, delivery: &Delivery) -> Result<()> {
        self.repository.create_delivery(delivery).await?;
        self.publish(ChangeEvent::delivery_inserted(delivery.clone()), delivery.id)
            .await;

        tracing::debug!(
            delivery_id = %delivery.id,
            sales_user_id = %delivery.sales_user_id,
            "Delivery created"
        );
        Ok(())
    }

    async fn update_delivery(&self, delivery: &Delivery) -> Result<()> {
        self.repository.update_delivery(delivery).await?;
        self.publish(ChangeEvent::delivery_updated(delivery.clone()), delivery.id)
            .await;

        tracing::debug!(
            delivery_id = %delivery.id,
            status = delivery.status.as_str(),
            "Delivery updated"
        );
        Ok(())
    }

    async fn update_delivery_if_unchanged(
        &self,
        current: &Delivery,
        updated: &Delivery,
    ) -> Result<bool> {
        let applied = self
            .repository
            .update_delivery_if_unchanged(current, updated)
            .await?;
        if applied {
            self.publish(ChangeEvent::delivery_updated(updated.clone()), updated.id)
                .await;
        } else {
            tracing::debug!(delivery_id = %current.id, "Delivery changed since it was read");
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotlink_core::marketplace::DeliveryKind;
    use lotlink_core::realtime::{ChangeKind, Record};

    use crate::storage::publishing::tests::RecordingPublisher;
    use crate::storage::InMemoryRepository;

    fn create_test_delivery() -> Delivery {
        Delivery::new(
            Uuid::new_v4(),
            DeliveryKind::Swap,
            "1HGCM82633A004352",
            "12 Lot Road",
            "34 Buyer Street",
        )
    }

    #[tokio::test]
    async fn test_create_publishes_insert() {
        let publisher = Arc::new(RecordingPublisher::default());
        let repo = PublishingDeliveryRepository::new(
            Arc::new(InMemoryRepository::new()),
            publisher.clone(),
        );
        let delivery = create_test_delivery();

        repo.create_delivery(&delivery).await.unwrap();

        let events = publisher.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Insert);
        assert_eq!(events[0].conversation_id, delivery.id);
        assert_eq!(events[0].record, Record::Delivery(delivery));
    }

    #[tokio::test]
    async fn test_update_publishes_update() {
        let publisher = Arc::new(RecordingPublisher::default());
        let repo = PublishingDeliveryRepository::new(
            Arc::new(InMemoryRepository::new()),
            publisher.clone(),
        );
        let mut delivery = create_test_delivery();
        repo.create_delivery(&delivery).await.unwrap();

        delivery.status = DeliveryStatus::Cancelled;
        repo.update_delivery(&delivery).await.unwrap();

        let events = publisher.events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, ChangeKind::Update);
    }

    #[tokio::test]
    async fn test_failed_write_publishes_nothing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let repo = PublishingDeliveryRepository::new(
            Arc::new(InMemoryRepository::new()),
            publisher.clone(),
        );

        let result = repo.update_delivery(&create_test_delivery()).await;

        assert!(result.is_err());
        assert!(publisher.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_conditional_update_publishes_nothing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let repo = PublishingDeliveryRepository::new(
            Arc::new(InMemoryRepository::new()),
            publisher.clone(),
        );
        let delivery = create_test_delivery();
        repo.create_delivery(&delivery).await.unwrap();

        let mut first = delivery.clone();
        first.status = DeliveryStatus::Accepted;
        let mut second = delivery.clone();
        second.status = DeliveryStatus::Cancelled;

        assert!(repo.update_delivery_if_unchanged(&delivery, &first).await.unwrap());
        assert!(!repo.update_delivery_if_unchanged(&delivery, &second).await.unwrap());

        let events = publisher.events().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].record, Record::Delivery(first));
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_write() {
        let publisher = Arc::new(RecordingPublisher::failing());
        let inner = Arc::new(InMemoryRepository::new());
        let repo = PublishingDeliveryRepository::new(inner.clone(), publisher);
        let delivery = create_test_delivery();

        repo.create_delivery(&delivery).await.unwrap();

        assert!(inner.get_delivery(delivery.id).await.unwrap().is_some());
    }
}
