//! In-memory change feed.
//!
//! Provides a thread-safe pub/sub mechanism for row changes using tokio
//! broadcast channels, one per table + conversation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use lotlink_core::realtime::{
    ChangeEvent, ChangeFeed, ChangeFilter, ChangePublisher, Result, Subscription,
};

/// Default channel capacity for change events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// In-memory change feed.
///
/// Each `ChangeFilter` gets its own broadcast channel so subscribers only
/// see the conversation they asked for. A subscription drains its broadcast
/// receiver into a private channel; dropping the subscription stops that
/// forwarder and releases the receiver.
#[derive(Debug, Clone)]
pub struct MemoryChangeFeed {
    channels: Arc<RwLock<HashMap<ChangeFilter, broadcast::Sender<ChangeEvent>>>>,
    capacity: usize,
}

impl MemoryChangeFeed {
    /// Creates a new empty feed. `capacity` bounds each channel's backlog.
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes to the channel for the given filter, creating it if needed.
    ///
    /// The receiver is taken while the lock is held so a concurrent prune
    /// cannot drop the channel between lookup and subscribe.
    async fn subscribe_channel(&self, filter: ChangeFilter) -> broadcast::Receiver<ChangeEvent> {
        // Try read lock first to avoid write contention
        {
            let channels = self.channels.read().await;
            if let Some(sender) = channels.get(&filter) {
                return sender.subscribe();
            }
        }

        let mut channels = self.channels.write().await;

        // Double-check after acquiring write lock
        if let Some(sender) = channels.get(&filter) {
            return sender.subscribe();
        }

        // Channels nobody listens to anymore go before a new one is added.
        channels.retain(|_, sender| sender.receiver_count() > 0);

        let (sender, receiver) = broadcast::channel(self.capacity);
        channels.insert(filter, sender);
        receiver
    }

    /// Drops the channel for `filter` if it has no receivers left.
    async fn prune_channel(&self, filter: ChangeFilter) {
        let mut channels = self.channels.write().await;
        if channels
            .get(&filter)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&filter);
            tracing::trace!(
                conversation_id = %filter.conversation_id,
                "Dropped change feed channel without subscribers"
            );
        }
    }

    /// Number of live subscribers for a filter.
    #[cfg(test)]
    pub async fn subscriber_count(&self, filter: ChangeFilter) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(&filter)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for MemoryChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl ChangePublisher for MemoryChangeFeed {
    async fn publish(&self, event: &ChangeEvent) -> Result<()> {
        let filter = event.filter();
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&filter) {
                Some(sender) => sender.send(event.clone()).is_ok(),
                // Nobody is watching this conversation.
                None => return Ok(()),
            }
        };

        if !delivered {
            self.prune_channel(filter).await;
        }

        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for MemoryChangeFeed {
    async fn subscribe(&self, filter: ChangeFilter) -> Result<Subscription> {
        let mut receiver = self.subscribe_channel(filter).await;

        tracing::debug!(
            table = filter.table.as_str(),
            conversation_id = %filter.conversation_id,
            "Change feed subscription opened"
        );

        Ok(Subscription::spawn(filter, self.capacity, move |tx| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            conversation_id = %filter.conversation_id,
                            lagged = n,
                            "Change feed subscriber lagged"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use lotlink_core::marketplace::Message;
    use uuid::Uuid;

    fn message_event(delivery_id: Uuid, body: &str) -> ChangeEvent {
        ChangeEvent::message_inserted(Message::new(
            delivery_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            body,
        ))
    }

    #[tokio::test]
    async fn test_publish_and_subscribe() {
        let feed = MemoryChangeFeed::default();
        let delivery_id = Uuid::new_v4();
        let event = message_event(delivery_id, "hello");

        // Subscribe first
        let mut subscription = feed
            .subscribe(ChangeFilter::messages(delivery_id))
            .await
            .unwrap();

        feed.publish(&event).await.unwrap();

        assert_eq!(subscription.recv().await, Some(event));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let feed = MemoryChangeFeed::default();
        let delivery_id = Uuid::new_v4();
        let filter = ChangeFilter::messages(delivery_id);
        let event = message_event(delivery_id, "hello");

        let mut first = feed.subscribe(filter).await.unwrap();
        let mut second = feed.subscribe(filter).await.unwrap();

        feed.publish(&event).await.unwrap();

        assert_eq!(first.recv().await, Some(event.clone()));
        assert_eq!(second.recv().await, Some(event));
    }

    #[tokio::test]
    async fn test_subscriptions_are_scoped_by_conversation() {
        let feed = MemoryChangeFeed::default();
        let delivery_1 = Uuid::new_v4();
        let delivery_2 = Uuid::new_v4();

        let mut sub_1 = feed
            .subscribe(ChangeFilter::messages(delivery_1))
            .await
            .unwrap();
        let mut sub_2 = feed
            .subscribe(ChangeFilter::messages(delivery_2))
            .await
            .unwrap();

        let event_1 = message_event(delivery_1, "one");
        let event_2 = message_event(delivery_2, "two");
        feed.publish(&event_1).await.unwrap();
        feed.publish(&event_2).await.unwrap();

        assert_eq!(sub_1.recv().await, Some(event_1));
        assert_eq!(sub_2.recv().await, Some(event_2));
    }

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let feed = MemoryChangeFeed::default();
        let result = feed.publish(&message_event(Uuid::new_v4(), "hi")).await;
        assert!(result.is_ok());

        // Publishing alone never allocates a channel
        assert!(feed.channels.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_channel_is_dropped_on_publish() {
        let feed = MemoryChangeFeed::default();
        let delivery_id = Uuid::new_v4();
        let filter = ChangeFilter::messages(delivery_id);

        let subscription = feed.subscribe(filter).await.unwrap();
        subscription.unsubscribe();
        tokio::time::timeout(Duration::from_secs(1), async {
            while feed.subscriber_count(filter).await > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("receiver should be released");
        assert_eq!(feed.channels.read().await.len(), 1);

        feed.publish(&message_event(delivery_id, "anyone?")).await.unwrap();
        assert!(feed.channels.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_channels_are_dropped_on_new_subscription() {
        let feed = MemoryChangeFeed::default();
        let stale = ChangeFilter::messages(Uuid::new_v4());
        let fresh = ChangeFilter::messages(Uuid::new_v4());

        feed.subscribe(stale).await.unwrap().unsubscribe();
        tokio::time::timeout(Duration::from_secs(1), async {
            while feed.subscriber_count(stale).await > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("receiver should be released");

        let _subscription = feed.subscribe(fresh).await.unwrap();
        let channels = feed.channels.read().await;
        assert_eq!(channels.len(), 1);
        assert!(channels.contains_key(&fresh));
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_receiver() {
        let feed = MemoryChangeFeed::default();
        let filter = ChangeFilter::messages(Uuid::new_v4());

        let subscription = feed.subscribe(filter).await.unwrap();
        assert_eq!(feed.subscriber_count(filter).await, 1);

        subscription.unsubscribe();

        tokio::time::timeout(Duration::from_secs(1), async {
            while feed.subscriber_count(filter).await > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("receiver should be released");
    }

    #[tokio::test]
    async fn test_channel_reuse() {
        let feed = MemoryChangeFeed::default();
        let filter = ChangeFilter::messages(Uuid::new_v4());

        let _first = feed.subscribe(filter).await.unwrap();
        let _second = feed.subscribe(filter).await.unwrap();

        let channels = feed.channels.read().await;
        assert_eq!(channels.len(), 1);
    }
}
