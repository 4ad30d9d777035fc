//! CLI command definitions.

pub mod dealers;
pub mod deliveries;
pub mod drivers;
pub mod events;
pub mod health;
pub mod messages;
pub mod sales_users;
pub mod unread;

use clap::{Parser, Subcommand, ValueEnum};

/// CLI client for the lotlink API.
#[derive(Debug, Parser)]
#[command(name = "lotlink-client")]
#[command(about = "CLI client for the lotlink API", long_about = None)]
pub struct Cli {
    /// Server base URL.
    #[arg(long, env = "LOTLINK_URL", default_value = "http://localhost:3000")]
    pub base_url: String,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Dealer management.
    Dealers(dealers::DealersCommand),
    /// Sales user management.
    SalesUsers(sales_users::SalesUsersCommand),
    /// Driver management.
    Drivers(drivers::DriversCommand),
    /// Delivery and swap jobs.
    Deliveries(deliveries::DeliveriesCommand),
    /// Per-delivery chat.
    Messages(messages::MessagesCommand),
    /// Watch real-time SSE events.
    Events(events::EventsCommand),
    /// Live unread message counts.
    Unread(unread::UnreadCommand),
    /// Server health checks.
    Health(health::HealthCommand),
}
