//! Unread-message tracking for a conversation.

mod counter;
mod state;

pub use counter::UnreadCounter;
pub use state::{classify_event, Binding, EventReaction, UnreadSnapshot};
