use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::AbortHandle;
use uuid::Uuid;

use super::state::{classify_event, Binding, EventReaction, UnreadSnapshot};
use crate::realtime::{ChangeFeed, ChangeFilter};
use crate::storage::{MessageQuery, MessageRepository};

/// Live count of unread messages addressed to one user in one conversation.
///
/// Activation spawns two independent tasks: the initial count query and the
/// change subscription. Inserts addressed to the viewing user bump the count,
/// any update triggers a full recount. The two tasks may finish in either
/// order and the last write wins.
///
/// Deactivation, rebinding and drop abort both tasks. Any write still in
/// flight carries a stale generation and is discarded.
pub struct UnreadCounter {
    messages: Arc<dyn MessageRepository>,
    feed: Arc<dyn ChangeFeed>,
    state: Arc<watch::Sender<UnreadSnapshot>>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl UnreadCounter {
    pub fn new(messages: Arc<dyn MessageRepository>, feed: Arc<dyn ChangeFeed>) -> Self {
        let (state, _) = watch::channel(UnreadSnapshot::default());
        Self {
            messages,
            feed,
            state: Arc::new(state),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Follows the identifiers currently available to the caller.
    ///
    /// Both present and different from the current binding: (re)activate.
    /// Either missing: deactivate. Unchanged: nothing happens.
    pub fn bind(&self, conversation_id: Option<Uuid>, user_id: Option<Uuid>) {
        match Binding::from_parts(conversation_id, user_id) {
            Some(binding) if self.binding() == Some(binding) => {}
            Some(binding) => self.activate(binding.conversation_id, binding.user_id),
            None => self.deactivate(),
        }
    }

    /// Starts tracking `user_id`'s unread messages in `conversation_id`.
    ///
    /// Any previous activation is torn down first. Must be called from within
    /// a tokio runtime.
    pub fn activate(&self, conversation_id: Uuid, user_id: Uuid) {
        let binding = Binding::new(conversation_id, user_id);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        abort_all(&mut tasks);

        let mut generation = 0;
        self.state.send_modify(|snapshot| {
            generation = snapshot.activate(binding);
        });

        tracing::debug!(
            conversation_id = %conversation_id,
            user_id = %user_id,
            generation,
            "Activating unread counter"
        );

        let initial = tokio::spawn(initial_count(
            self.messages.clone(),
            self.state.clone(),
            binding,
            generation,
        ));
        let listener = tokio::spawn(listen(
            self.messages.clone(),
            self.feed.clone(),
            self.state.clone(),
            binding,
            generation,
        ));

        tasks.push(initial.abort_handle());
        tasks.push(listener.abort_handle());
    }

    /// Releases the subscription and returns to INACTIVE (count 0).
    pub fn deactivate(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        abort_all(&mut tasks);

        let was_active = self.state.send_if_modified(|snapshot| {
            let was_active = snapshot.is_active();
            snapshot.deactivate();
            was_active
        });

        if was_active {
            tracing::debug!("Deactivated unread counter");
        }
    }

    /// The currently displayed count. Zero while inactive.
    pub fn count(&self) -> u64 {
        self.state.borrow().count
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().is_active()
    }

    pub fn binding(&self) -> Option<Binding> {
        self.state.borrow().binding
    }

    pub fn snapshot(&self) -> UnreadSnapshot {
        *self.state.borrow()
    }

    /// Watches the counter. The receiver sees every accepted write.
    pub fn subscribe(&self) -> watch::Receiver<UnreadSnapshot> {
        self.state.subscribe()
    }
}

impl Drop for UnreadCounter {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        abort_all(tasks);
    }
}

fn abort_all(tasks: &mut Vec<AbortHandle>) {
    for task in tasks.drain(..) {
        task.abort();
    }
}

/// Runs the full count query. Failures count as zero.
async fn fetch_count(messages: &dyn MessageRepository, binding: Binding) -> u64 {
    let query = MessageQuery::unread_for(binding.conversation_id, binding.user_id);
    match messages.count_messages(&query).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(
                conversation_id = %binding.conversation_id,
                user_id = %binding.user_id,
                error = %e,
                "Unread count query failed, using 0"
            );
            0
        }
    }
}

async fn initial_count(
    messages: Arc<dyn MessageRepository>,
    state: Arc<watch::Sender<UnreadSnapshot>>,
    binding: Binding,
    generation: u64,
) {
    let count = fetch_count(messages.as_ref(), binding).await;
    state.send_if_modified(|snapshot| snapshot.set_count(generation, count));
}

async fn listen(
    messages: Arc<dyn MessageRepository>,
    feed: Arc<dyn ChangeFeed>,
    state: Arc<watch::Sender<UnreadSnapshot>>,
    binding: Binding,
    generation: u64,
) {
    let filter = ChangeFilter::messages(binding.conversation_id);
    let mut subscription = match feed.subscribe(filter).await {
        Ok(subscription) => subscription,
        Err(e) => {
            // No reconnection. The counter keeps whatever the query produced.
            tracing::warn!(
                conversation_id = %binding.conversation_id,
                error = %e,
                "Unread counter subscription failed"
            );
            return;
        }
    };

    while let Some(event) = subscription.recv().await {
        match classify_event(&event, binding.user_id) {
            EventReaction::Increment => {
                state.send_if_modified(|snapshot| snapshot.increment(generation));
            }
            EventReaction::Refetch => {
                let count = fetch_count(messages.as_ref(), binding).await;
                state.send_if_modified(|snapshot| snapshot.set_count(generation, count));
            }
            EventReaction::Ignore => {}
        }
    }

    tracing::debug!(
        conversation_id = %binding.conversation_id,
        "Change feed closed for unread counter"
    );
}
