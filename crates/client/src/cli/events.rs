//! Events CLI commands.

use clap::{Parser, Subcommand, ValueEnum};
use lotlink_core::realtime::Table;
use uuid::Uuid;

/// Events management commands.
#[derive(Debug, Parser)]
pub struct EventsCommand {
    #[command(subcommand)]
    pub action: EventsAction,
}

/// Table to watch, as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TableArg {
    Messages,
    Deliveries,
}

impl From<TableArg> for Table {
    fn from(table: TableArg) -> Self {
        match table {
            TableArg::Messages => Table::Messages,
            TableArg::Deliveries => Table::Deliveries,
        }
    }
}

/// Available events actions.
#[derive(Debug, Subcommand)]
pub enum EventsAction {
    /// Watch real-time SSE events.
    Watch {
        /// Delivery (conversation) ID to watch.
        conversation_id: Uuid,
        #[arg(long, value_enum, default_value = "messages")]
        table: TableArg,
        /// Resume from event ID.
        #[arg(long)]
        last_event_id: Option<u64>,
    },
}
