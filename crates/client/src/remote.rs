//! Backend contract implemented over the lotlink HTTP API.
//!
//! Lets an [`UnreadCounter`](lotlink_core::unread::UnreadCounter) run on the
//! client side: counted reads go to `/api/messages/count` and change
//! subscriptions are SSE connections to `/api/events`.

use async_trait::async_trait;
use tokio_stream::StreamExt;
use uuid::Uuid;

use lotlink_core::marketplace::{Message, SendMessageRequest};
use lotlink_core::realtime::{ChangeFeed, ChangeFilter, FeedError, Subscription};
use lotlink_core::storage::{MessageQuery, MessageRepository, RepositoryError};

use crate::client::{events::change_event_stream, LotlinkClient};
use crate::error::ClientError;

/// Default backlog between the SSE reader and the subscriber.
pub const DEFAULT_SUBSCRIPTION_CAPACITY: usize = 64;

/// `MessageRepository` + `ChangeFeed` backed by a running lotlink server.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: LotlinkClient,
}

impl RemoteBackend {
    pub fn new(client: LotlinkClient) -> Self {
        Self { client }
    }
}

impl From<ClientError> for RepositoryError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::NotFound { resource } => RepositoryError::NotFound {
                entity_type: "Resource",
                id: resource,
            },
            ClientError::Request(e) => RepositoryError::ConnectionFailed(e.to_string()),
            ClientError::Connection(e) => RepositoryError::ConnectionFailed(e),
            ClientError::Json(e) => RepositoryError::Serialization(e.to_string()),
            ClientError::InvalidResponse(e) => RepositoryError::Serialization(e),
            ClientError::InvalidInput(e) => RepositoryError::InvalidData(e),
            other => RepositoryError::QueryFailed(other.to_string()),
        }
    }
}

impl From<ClientError> for FeedError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Request(e) => FeedError::ConnectionFailed(e.to_string()),
            ClientError::Connection(e) => FeedError::ConnectionFailed(e),
            ClientError::Json(e) => FeedError::Serialization(e.to_string()),
            other => FeedError::SubscribeFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl MessageRepository for RemoteBackend {
    async fn get_message(&self, id: Uuid) -> Result<Option<Message>, RepositoryError> {
        match self.client.get_message(id).await {
            Ok(message) => Ok(Some(message)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Only conversation-scoped listings are available remotely.
    async fn list_messages(&self, query: &MessageQuery) -> Result<Vec<Message>, RepositoryError> {
        let delivery_id = query.delivery_id.ok_or_else(|| {
            RepositoryError::QueryFailed("remote listing requires a delivery_id".to_string())
        })?;

        let messages = self.client.list_messages(delivery_id).await?;
        Ok(messages
            .into_iter()
            .filter(|message| query.matches(message))
            .collect())
    }

    async fn count_messages(&self, query: &MessageQuery) -> Result<u64, RepositoryError> {
        Ok(self.client.count_messages(query).await?)
    }

    /// The server assigns its own ID and timestamp to the stored message.
    async fn create_message(&self, message: &Message) -> Result<(), RepositoryError> {
        let request = SendMessageRequest {
            sender_id: message.sender_id,
            recipient_id: Some(message.recipient_id),
            body: message.body.clone(),
        };
        self.client
            .send_message(message.delivery_id, request)
            .await?;
        Ok(())
    }

    /// Read receipts are the only message update the API exposes.
    async fn update_message(&self, message: &Message) -> Result<(), RepositoryError> {
        if !message.read {
            return Err(RepositoryError::InvalidData(
                "messages can only be marked read remotely".to_string(),
            ));
        }
        self.client.mark_message_read(message.id).await?;
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for RemoteBackend {
    async fn subscribe(&self, filter: ChangeFilter) -> Result<Subscription, FeedError> {
        let response = self.client.open_event_stream(filter, None).await?;
        let stream = change_event_stream(response);

        tracing::debug!(
            table = filter.table.as_str(),
            conversation_id = %filter.conversation_id,
            "Opened remote change subscription"
        );

        Ok(Subscription::spawn(
            filter,
            DEFAULT_SUBSCRIPTION_CAPACITY,
            move |sender| async move {
                tokio::pin!(stream);
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(received) => {
                            if sender.send(received.event).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(
                                conversation_id = %filter.conversation_id,
                                error = %e,
                                "Remote change stream failed"
                            );
                            break;
                        }
                    }
                }
            },
        ))
    }
}
