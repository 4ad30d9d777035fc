//! A cancellable, filtered stream of change events.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use super::{ChangeEvent, ChangeFilter};

/// A live subscription to one table + conversation.
///
/// Events are pushed by a background forwarder task owned by the subscription.
/// Calling [`Subscription::unsubscribe`] or dropping the value aborts that task,
/// so no further events are delivered and the upstream channel is released.
#[derive(Debug)]
pub struct Subscription {
    filter: ChangeFilter,
    receiver: mpsc::Receiver<ChangeEvent>,
    forwarder: Option<AbortHandle>,
}

impl Subscription {
    /// Spawns `forward` with the sending half of a bounded channel and returns
    /// the receiving half as a subscription.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(filter: ChangeFilter, capacity: usize, forward: F) -> Self
    where
        F: FnOnce(mpsc::Sender<ChangeEvent>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(forward(sender));
        Self {
            filter,
            receiver,
            forwarder: Some(handle.abort_handle()),
        }
    }

    /// Wraps an existing receiver. Used by in-process fakes that push events
    /// directly.
    pub fn from_receiver(filter: ChangeFilter, receiver: mpsc::Receiver<ChangeEvent>) -> Self {
        Self {
            filter,
            receiver,
            forwarder: None,
        }
    }

    /// The filter this subscription was opened with.
    pub fn filter(&self) -> ChangeFilter {
        self.filter
    }

    /// Waits for the next event. Returns `None` once the feed has closed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }

    /// Releases the subscription.
    pub fn unsubscribe(self) {
        tracing::trace!(
            table = self.filter.table.as_str(),
            conversation_id = %self.filter.conversation_id,
            "Unsubscribing from change feed"
        );
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.forwarder.take() {
            handle.abort();
        }
        self.receiver.close();
    }
}
