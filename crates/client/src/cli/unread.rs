//! Unread counter CLI commands.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Unread count commands.
#[derive(Debug, Parser)]
pub struct UnreadCommand {
    #[command(subcommand)]
    pub action: UnreadAction,
}

/// Available unread actions.
#[derive(Debug, Subcommand)]
pub enum UnreadAction {
    /// Print the live unread count for a user on a delivery.
    Watch {
        /// Delivery (conversation) ID.
        delivery_id: Uuid,
        /// Viewing user.
        #[arg(long)]
        user_id: Uuid,
        /// Follow the server's counter instead of running one locally.
        #[arg(long)]
        server: bool,
    },
}
