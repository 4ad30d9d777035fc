//! Sales user CLI commands.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Sales user management commands.
#[derive(Debug, Parser)]
pub struct SalesUsersCommand {
    #[command(subcommand)]
    pub action: SalesUsersAction,
}

/// Available sales user actions.
#[derive(Debug, Subcommand)]
pub enum SalesUsersAction {
    /// List sales users.
    List {
        /// Only users of this dealer.
        #[arg(long)]
        dealer_id: Option<Uuid>,
    },
    /// Add a sales user to a dealer.
    Create {
        /// Dealer the user works for.
        #[arg(long)]
        dealer_id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Get sales user by ID.
    Get {
        /// Sales user ID.
        id: Uuid,
    },
}
