//! Driver CLI commands.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Driver management commands.
#[derive(Debug, Parser)]
pub struct DriversCommand {
    #[command(subcommand)]
    pub action: DriversAction,
}

/// Available driver actions.
#[derive(Debug, Subcommand)]
pub enum DriversAction {
    /// List drivers.
    List {
        /// Only drivers currently taking jobs.
        #[arg(long)]
        available: bool,
    },
    /// Register a driver.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Get driver by ID.
    Get {
        /// Driver ID.
        id: Uuid,
    },
    /// Update a driver's phone or availability.
    Update {
        /// Driver ID.
        id: Uuid,
        #[arg(long)]
        phone: Option<String>,
        /// Whether the driver is taking jobs.
        #[arg(long)]
        available: Option<bool>,
    },
}
