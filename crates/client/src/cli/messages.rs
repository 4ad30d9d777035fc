//! Chat message CLI commands.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Chat message commands.
#[derive(Debug, Parser)]
pub struct MessagesCommand {
    #[command(subcommand)]
    pub action: MessagesAction,
}

/// Available message actions.
#[derive(Debug, Subcommand)]
pub enum MessagesAction {
    /// List a delivery's conversation.
    List {
        /// Delivery ID.
        delivery_id: Uuid,
    },
    /// Send a message on a delivery.
    Send {
        /// Delivery ID.
        delivery_id: Uuid,
        /// Sending participant.
        #[arg(long)]
        sender_id: Uuid,
        /// Defaults to the other participant.
        #[arg(long)]
        recipient_id: Option<Uuid>,
        /// Message text.
        body: String,
    },
    /// Mark one message read.
    Read {
        /// Message ID.
        id: Uuid,
    },
    /// Mark every message to a recipient on a delivery read.
    ReadAll {
        /// Delivery ID.
        delivery_id: Uuid,
        #[arg(long)]
        recipient_id: Uuid,
    },
    /// Count unread messages addressed to a user on a delivery.
    Unread {
        /// Delivery ID.
        delivery_id: Uuid,
        #[arg(long)]
        user_id: Uuid,
    },
}
