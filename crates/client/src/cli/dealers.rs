//! Dealer CLI commands.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Dealer management commands.
#[derive(Debug, Parser)]
pub struct DealersCommand {
    #[command(subcommand)]
    pub action: DealersAction,
}

/// Available dealer actions.
#[derive(Debug, Subcommand)]
pub enum DealersAction {
    /// List all dealers.
    List,
    /// Register a dealer.
    Create {
        /// Dealership name.
        #[arg(long)]
        name: String,
        /// Street address.
        #[arg(long)]
        address: Option<String>,
    },
    /// Get dealer by ID.
    Get {
        /// Dealer ID.
        id: Uuid,
    },
}
