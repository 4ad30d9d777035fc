use async_trait::async_trait;

use super::{ChangeEvent, ChangeFilter, Result, Subscription};

/// Publishes row-level change events to subscribers.
#[async_trait]
pub trait ChangePublisher: Send + Sync {
    /// Publishes a change event. Having no subscribers is not an error.
    async fn publish(&self, event: &ChangeEvent) -> Result<()>;
}

/// Delivers change events for a table + conversation filter.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Opens a subscription. Events published before this call are not replayed.
    async fn subscribe(&self, filter: ChangeFilter) -> Result<Subscription>;
}
