//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. Rows are stored behind repository trait objects; writes
//! to deliveries and messages go through publishing decorators so every
//! change reaches the change feed.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, PoisonError, RwLock,
    },
};
use tokio::sync::{broadcast, oneshot};

use lotlink_core::realtime::{ChangeEvent, ChangeFeed, ChangeFilter, FeedError};
use lotlink_core::storage::{
    DealerRepository, DeliveryRepository, DriverRepository, MessageRepository,
    SalesUserRepository,
};

use crate::config::Config;
use crate::realtime::MemoryChangeFeed;
use crate::storage::{
    InMemoryRepository, PublishingDeliveryRepository, PublishingMessageRepository,
};

/// A change event with its ID for replay on reconnection.
#[derive(Clone, Debug)]
pub struct StoredEvent {
    pub id: u64,
    pub event: ChangeEvent,
}

/// A running history listener and the SSE connections that keep it alive.
struct ListenerEntry {
    id: u64,
    connections: usize,
    /// Dropping this sender stops the listener task.
    _stop: oneshot::Sender<()>,
}

type ListenerMap = Arc<RwLock<HashMap<ChangeFilter, ListenerEntry>>>;

/// Keeps the history listener for one filter running.
///
/// Returned by [`AppState::ensure_event_listener`]. When the last guard for
/// a filter is dropped the listener stops and its feed subscription is
/// released.
pub struct EventListenerGuard {
    listeners: ListenerMap,
    filter: ChangeFilter,
    id: u64,
}

impl Drop for EventListenerGuard {
    fn drop(&mut self) {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = listeners.get_mut(&self.filter) else {
            return;
        };
        if entry.id != self.id {
            return;
        }
        entry.connections = entry.connections.saturating_sub(1);
        if entry.connections == 0 {
            listeners.remove(&self.filter);
            tracing::debug!(
                conversation_id = %self.filter.conversation_id,
                "Last SSE connection closed, stopping event listener"
            );
        }
    }
}

/// Shared application state.
///
/// This is cloned for each request handler and contains shared resources
/// including repository trait objects and the change feed.
#[derive(Clone)]
pub struct AppState {
    pub dealer_repo: Arc<dyn DealerRepository>,
    pub sales_user_repo: Arc<dyn SalesUserRepository>,
    pub driver_repo: Arc<dyn DriverRepository>,
    /// Delivery repository (publishing, wraps underlying storage).
    pub delivery_repo: Arc<dyn DeliveryRepository>,
    /// Message repository (publishing, wraps underlying storage).
    pub message_repo: Arc<dyn MessageRepository>,
    /// Change feed for subscriptions (SSE streams and unread counters).
    pub change_feed: Arc<dyn ChangeFeed>,

    /// Event counter for generating unique event IDs.
    event_counter: Arc<AtomicU64>,
    /// Event history for SSE reconnection catch-up.
    event_history: Arc<RwLock<VecDeque<StoredEvent>>>,
    /// Maximum events to keep in history.
    event_history_max_size: usize,
    /// Running history listeners by filter.
    active_listeners: ListenerMap,
    /// Source of listener IDs.
    listener_ids: Arc<AtomicU64>,
    /// Fan-out of freshly stored events to live SSE connections.
    history_tx: broadcast::Sender<StoredEvent>,

    /// Shutdown signal sender for SSE connections.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Creates AppState with in-memory storage and an in-memory change feed.
    pub fn new(config: &Config) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let feed = Arc::new(MemoryChangeFeed::new(config.event_channel_capacity));

        let delivery_repo = Arc::new(PublishingDeliveryRepository::new(
            repo.clone(),
            feed.clone(),
        ));
        let message_repo = Arc::new(PublishingMessageRepository::new(repo.clone(), feed.clone()));

        Self::build(
            repo.clone(),
            repo.clone(),
            repo,
            delivery_repo,
            message_repo,
            feed,
            config,
        )
    }

    /// Assembles the state from its parts.
    fn build(
        dealer_repo: Arc<dyn DealerRepository>,
        sales_user_repo: Arc<dyn SalesUserRepository>,
        driver_repo: Arc<dyn DriverRepository>,
        delivery_repo: Arc<dyn DeliveryRepository>,
        message_repo: Arc<dyn MessageRepository>,
        change_feed: Arc<dyn ChangeFeed>,
        config: &Config,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (history_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));

        Self {
            dealer_repo,
            sales_user_repo,
            driver_repo,
            delivery_repo,
            message_repo,
            change_feed,
            event_counter: Arc::new(AtomicU64::new(1)),
            event_history: Arc::new(RwLock::new(VecDeque::new())),
            event_history_max_size: config.event_history_max_size,
            active_listeners: Arc::new(RwLock::new(HashMap::new())),
            listener_ids: Arc::new(AtomicU64::new(1)),
            history_tx,
            shutdown_tx,
        }
    }

    /// Get the oldest event ID in the history.
    ///
    /// Returns 0 if history is empty.
    pub fn oldest_event_id(&self) -> u64 {
        self.event_history
            .read()
            .ok()
            .and_then(|h| h.front().map(|e| e.id))
            .unwrap_or(0)
    }

    /// Number of events currently kept for replay.
    pub fn event_history_len(&self) -> usize {
        self.event_history.read().map(|h| h.len()).unwrap_or(0)
    }

    /// Get events since a given event ID for a specific filter.
    pub fn get_events_since(&self, filter: ChangeFilter, since_id: u64) -> Vec<StoredEvent> {
        self.event_history
            .read()
            .ok()
            .map(|history| {
                history
                    .iter()
                    .filter(|e| e.id > since_id && filter.matches(&e.event))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Store an event in the local event history and fan it out to live
    /// SSE connections.
    pub fn store_event(&self, event: ChangeEvent) -> StoredEvent {
        let id = self.event_counter.fetch_add(1, Ordering::SeqCst);
        let stored = StoredEvent { id, event };

        tracing::trace!(
            event_id = id,
            conversation_id = %stored.event.conversation_id,
            "Storing event in history"
        );

        if let Ok(mut history) = self.event_history.write() {
            history.push_back(stored.clone());

            // Trim old events if history is too large
            while history.len() > self.event_history_max_size {
                history.pop_front();
            }
        }

        let _ = self.history_tx.send(stored.clone());
        stored
    }

    /// Subscribe to events as they enter the history.
    pub fn subscribe_history(&self) -> broadcast::Receiver<StoredEvent> {
        self.history_tx.subscribe()
    }

    /// Ensures a history listener is running for the given filter.
    ///
    /// If a listener is already running, this only registers one more
    /// connection. Otherwise the change feed subscription is opened before
    /// returning, so events published after this call are recorded. The
    /// listener runs until every returned guard has been dropped.
    pub async fn ensure_event_listener(
        &self,
        filter: ChangeFilter,
    ) -> Result<EventListenerGuard, FeedError> {
        let (id, stop_rx) = {
            let mut listeners = self
                .active_listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = listeners.get_mut(&filter) {
                entry.connections += 1;
                return Ok(self.listener_guard(filter, entry.id));
            }

            let id = self.listener_ids.fetch_add(1, Ordering::Relaxed);
            let (stop_tx, stop_rx) = oneshot::channel();
            listeners.insert(
                filter,
                ListenerEntry {
                    id,
                    connections: 1,
                    _stop: stop_tx,
                },
            );
            (id, stop_rx)
        };
        let guard = self.listener_guard(filter, id);

        let mut subscription = match self.change_feed.subscribe(filter).await {
            Ok(subscription) => subscription,
            Err(err) => {
                tracing::error!(
                    conversation_id = %filter.conversation_id,
                    error = %err,
                    "Failed to subscribe to change feed"
                );
                self.remove_listener(filter, id);
                return Err(err);
            }
        };

        let state = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            tracing::debug!(
                table = filter.table.as_str(),
                conversation_id = %filter.conversation_id,
                "Event listener started"
            );

            tokio::pin!(stop_rx);
            loop {
                tokio::select! {
                    event = subscription.recv() => {
                        match event {
                            Some(event) => {
                                state.store_event(event);
                            }
                            None => {
                                tracing::info!(
                                    conversation_id = %filter.conversation_id,
                                    "Change feed closed"
                                );
                                break;
                            }
                        }
                    }
                    _ = &mut stop_rx => {
                        tracing::debug!(
                            conversation_id = %filter.conversation_id,
                            "Event listener stopped"
                        );
                        break;
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::debug!(
                            conversation_id = %filter.conversation_id,
                            "Event listener shutting down"
                        );
                        break;
                    }
                }
            }

            state.remove_listener(filter, id);
        });

        Ok(guard)
    }

    fn listener_guard(&self, filter: ChangeFilter, id: u64) -> EventListenerGuard {
        EventListenerGuard {
            listeners: self.active_listeners.clone(),
            filter,
            id,
        }
    }

    /// Number of filters with a running history listener.
    pub fn active_listener_count(&self) -> usize {
        self.active_listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    /// Removes the listener entry, unless a newer listener replaced it.
    fn remove_listener(&self, filter: ChangeFilter, id: u64) {
        if let Ok(mut listeners) = self.active_listeners.write() {
            if listeners.get(&filter).is_some_and(|entry| entry.id == id) {
                listeners.remove(&filter);
            }
        }
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal all SSE connections to shut down.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

#[cfg(test)]
impl Default for AppState {
    /// Creates an empty in-memory AppState for tests.
    fn default() -> Self {
        Self::new(&Config {
            seed_demo_data: false,
            ..Config::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use lotlink_core::marketplace::Message;
    use uuid::Uuid;

    fn message_event(delivery_id: Uuid) -> ChangeEvent {
        ChangeEvent::message_inserted(Message::new(
            delivery_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            "hello",
        ))
    }

    #[test]
    fn test_history_is_bounded() {
        let state = AppState::new(&Config {
            event_history_max_size: 3,
            ..Config::default()
        });
        let delivery_id = Uuid::new_v4();

        for _ in 0..5 {
            state.store_event(message_event(delivery_id));
        }

        assert_eq!(state.event_history_len(), 3);
        assert_eq!(state.oldest_event_id(), 3);
    }

    #[test]
    fn test_get_events_since_filters() {
        let state = AppState::default();
        let delivery_a = Uuid::new_v4();
        let delivery_b = Uuid::new_v4();

        let first = state.store_event(message_event(delivery_a));
        state.store_event(message_event(delivery_b));
        let third = state.store_event(message_event(delivery_a));

        let filter = ChangeFilter::messages(delivery_a);
        let all: Vec<u64> = state
            .get_events_since(filter, 0)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(all, vec![first.id, third.id]);

        let missed = state.get_events_since(filter, first.id);
        assert_eq!(missed.len(), 1);
        assert_eq!(missed[0].id, third.id);
    }

    #[tokio::test]
    async fn test_event_listener_records_published_messages() {
        let state = AppState::default();
        let delivery_id = Uuid::new_v4();
        let filter = ChangeFilter::messages(delivery_id);

        let _first = state.ensure_event_listener(filter).await.unwrap();
        let _second = state.ensure_event_listener(filter).await.unwrap();
        assert_eq!(state.active_listener_count(), 1);

        let message = Message::new(delivery_id, Uuid::new_v4(), Uuid::new_v4(), "hi");
        state.message_repo.create_message(&message).await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while state.get_events_since(filter, 0).is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("event should be recorded");

        state.signal_shutdown();
        tokio::time::timeout(Duration::from_secs(1), async {
            while state.active_listener_count() > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("listener should stop on shutdown");
    }

    #[tokio::test]
    async fn test_event_listener_stops_after_last_guard() {
        let feed = Arc::new(MemoryChangeFeed::default());
        let repo = Arc::new(InMemoryRepository::new());
        let state = AppState::build(
            repo.clone(),
            repo.clone(),
            repo.clone(),
            repo.clone(),
            repo,
            feed.clone(),
            &Config::default(),
        );
        let filter = ChangeFilter::messages(Uuid::new_v4());

        let first = state.ensure_event_listener(filter).await.unwrap();
        let second = state.ensure_event_listener(filter).await.unwrap();
        assert_eq!(feed.subscriber_count(filter).await, 1);

        drop(first);
        assert_eq!(state.active_listener_count(), 1);

        drop(second);
        assert_eq!(state.active_listener_count(), 0);
        tokio::time::timeout(Duration::from_secs(1), async {
            while feed.subscriber_count(filter).await > 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("listener should release its subscription");

        // A new connection starts a fresh listener
        let _third = state.ensure_event_listener(filter).await.unwrap();
        assert_eq!(state.active_listener_count(), 1);
    }
}
