//! Pure state for the unread-message counter.
//!
//! Every write carries the generation of the activation that produced it.
//! Writes from a superseded activation are rejected, which is how a
//! deactivated or rebound counter stops reacting to late results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::realtime::{ChangeEvent, ChangeKind, Table};

/// The conversation and viewing user a counter is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binding {
    pub conversation_id: Uuid,
    pub user_id: Uuid,
}

impl Binding {
    pub fn new(conversation_id: Uuid, user_id: Uuid) -> Self {
        Self {
            conversation_id,
            user_id,
        }
    }

    /// Builds a binding only when both identifiers are present.
    pub fn from_parts(conversation_id: Option<Uuid>, user_id: Option<Uuid>) -> Option<Self> {
        Some(Self::new(conversation_id?, user_id?))
    }
}

/// Observable counter state.
///
/// INACTIVE is `binding == None` with `count == 0`. ACTIVE carries the
/// binding and the currently displayed count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadSnapshot {
    pub generation: u64,
    pub binding: Option<Binding>,
    pub count: u64,
}

impl UnreadSnapshot {
    pub fn is_active(&self) -> bool {
        self.binding.is_some()
    }

    /// Starts a new activation and returns its generation.
    pub fn activate(&mut self, binding: Binding) -> u64 {
        self.generation += 1;
        self.binding = Some(binding);
        self.count = 0;
        self.generation
    }

    /// Returns to INACTIVE and invalidates every in-flight write.
    pub fn deactivate(&mut self) -> u64 {
        self.generation += 1;
        self.binding = None;
        self.count = 0;
        self.generation
    }

    /// Replaces the count if `generation` is still current.
    ///
    /// Returns true when the snapshot changed.
    pub fn set_count(&mut self, generation: u64, count: u64) -> bool {
        if !self.accepts(generation) || self.count == count {
            return false;
        }
        self.count = count;
        true
    }

    /// Adds one to the count if `generation` is still current.
    pub fn increment(&mut self, generation: u64) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.count = self.count.saturating_add(1);
        true
    }

    fn accepts(&self, generation: u64) -> bool {
        self.binding.is_some() && self.generation == generation
    }
}

/// What the counter does in response to a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventReaction {
    /// A new message for the viewing user: count + 1, no query.
    Increment,
    /// Some message changed (possibly a read receipt): recount from source.
    Refetch,
    Ignore,
}

/// Classifies a message change event for the viewing user.
pub fn classify_event(event: &ChangeEvent, user_id: Uuid) -> EventReaction {
    if event.table != Table::Messages {
        return EventReaction::Ignore;
    }

    match event.kind {
        ChangeKind::Insert if event.recipient_id() == Some(user_id) => EventReaction::Increment,
        ChangeKind::Insert => EventReaction::Ignore,
        ChangeKind::Update => EventReaction::Refetch,
    }
}
