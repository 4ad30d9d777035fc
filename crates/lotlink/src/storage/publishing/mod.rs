//! Publishing repository decorators.
//!
//! Wrap a repository so every successful write of a conversation-scoped row
//! (deliveries and messages) is followed by a `ChangeEvent`:
//!
//! - **Reads**: delegated unchanged
//! - **Writes**: persist to the repository, then publish via `ChangePublisher`
//!
//! # Example
//!
//! ```ignore
//! let repo = Arc::new(InMemoryRepository::new());
//! let feed = Arc::new(MemoryChangeFeed::new(100));
//!
//! let messages = PublishingMessageRepository::new(repo, feed);
//! ```

mod delivery;
mod message;

pub use delivery::PublishingDeliveryRepository;
pub use message::PublishingMessageRepository;

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use lotlink_core::realtime::{ChangeEvent, ChangePublisher, FeedError, Result};

    /// Publisher that records every event it is handed.
    #[derive(Default)]
    pub struct RecordingPublisher {
        events: RwLock<Vec<ChangeEvent>>,
        fail: bool,
    }

    impl RecordingPublisher {
        pub fn failing() -> Self {
            Self {
                events: RwLock::new(Vec::new()),
                fail: true,
            }
        }

        pub async fn events(&self) -> Vec<ChangeEvent> {
            self.events.read().await.clone()
        }
    }

    #[async_trait]
    impl ChangePublisher for RecordingPublisher {
        async fn publish(&self, event: &ChangeEvent) -> Result<()> {
            if self.fail {
                return Err(FeedError::PublishFailed("broker unavailable".to_string()));
            }
            self.events.write().await.push(event.clone());
            Ok(())
        }
    }
}
