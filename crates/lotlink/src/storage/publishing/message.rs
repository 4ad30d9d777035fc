//! Message repository decorator that publishes change events.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use lotlink_core::marketplace::Message;
use lotlink_core::realtime::{ChangeEvent, ChangePublisher};
use lotlink_core::storage::{MessageQuery, MessageRepository, Result};

/// Publishing message repository decorator.
///
/// Every created message becomes an insert event and every updated message
/// (read receipts included) an update event on the message's delivery.
pub struct PublishingMessageRepository<R, P>
where
    R: MessageRepository,
    P: ChangePublisher + ?Sized,
{
    repository: Arc<R>,
    publisher: Arc<P>,
}

impl<R, P> PublishingMessageRepository<R, P>
where
    R: MessageRepository,
    P: ChangePublisher + ?Sized,
{
    pub fn new(repository: Arc<R>, publisher: Arc<P>) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    async fn publish(&self, event: ChangeEvent, message: &Message) {
        if let Err(err) = self.publisher.publish(&event).await {
            tracing::warn!(
                delivery_id = %message.delivery_id,
                message_id = %message.id,
                kind = event.kind.as_str(),
                error = %err,
                "Failed to publish message change"
            );
        }
    }
}

#[async_trait]
impl<R, P> MessageRepository for PublishingMessageRepository<R, P>
where
    R: MessageRepository + 'static,
    P: ChangePublisher + ?Sized + 'static,
{
    async fn get_message(&self, id: Uuid) -> Result<Option<Message>> {
        self.repository.get_message(id).await
    }

    async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>> {
        self.repository.list_messages(query).await
    }

    async fn count_messages(&self, query: &MessageQuery) -> Result<u64> {
        self.repository.count_messages(query).await
    }

    async fn create_message(&self, message: &Message) -> Result<()> {
        self.repository.create_message(message).await?;
        self.publish(ChangeEvent::message_inserted(message.clone()), message)
            .await;

        tracing::debug!(
            message_id = %message.id,
            delivery_id = %message.delivery_id,
            recipient_id = %message.recipient_id,
            "Message created"
        );
        Ok(())
    }

    async fn update_message(&self, message: &Message) -> Result<()> {
        self.repository.update_message(message).await?;
        self.publish(ChangeEvent::message_updated(message.clone()), message)
            .await;

        tracing::debug!(
            message_id = %message.id,
            delivery_id = %message.delivery_id,
            read = message.read,
            "Message updated"
        );
        Ok(())
    }
}
