//! Delivery CLI commands.

use clap::{Parser, Subcommand, ValueEnum};
use lotlink_core::marketplace::{DeliveryKind, DeliveryStatus};
use uuid::Uuid;

/// Delivery management commands.
#[derive(Debug, Parser)]
pub struct DeliveriesCommand {
    #[command(subcommand)]
    pub action: DeliveriesAction,
}

/// Kind of job, as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Delivery,
    Swap,
}

impl From<KindArg> for DeliveryKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Delivery => DeliveryKind::Delivery,
            KindArg::Swap => DeliveryKind::Swap,
        }
    }
}

/// Delivery status, as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Requested,
    Accepted,
    InTransit,
    Delivered,
    Cancelled,
}

impl From<StatusArg> for DeliveryStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Requested => DeliveryStatus::Requested,
            StatusArg::Accepted => DeliveryStatus::Accepted,
            StatusArg::InTransit => DeliveryStatus::InTransit,
            StatusArg::Delivered => DeliveryStatus::Delivered,
            StatusArg::Cancelled => DeliveryStatus::Cancelled,
        }
    }
}

/// Available delivery actions.
#[derive(Debug, Subcommand)]
pub enum DeliveriesAction {
    /// List deliveries.
    List {
        #[arg(long)]
        sales_user_id: Option<Uuid>,
        #[arg(long)]
        driver_id: Option<Uuid>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Request a delivery or swap.
    Create {
        /// Requesting sales user.
        #[arg(long)]
        sales_user_id: Uuid,
        #[arg(long, value_enum, default_value = "delivery")]
        kind: KindArg,
        /// 17-character vehicle identification number.
        #[arg(long)]
        vin: String,
        #[arg(long)]
        pickup: String,
        #[arg(long)]
        dropoff: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Get delivery by ID.
    Get {
        /// Delivery ID.
        id: Uuid,
    },
    /// Edit addresses or notes of an open delivery.
    Update {
        /// Delivery ID.
        id: Uuid,
        #[arg(long)]
        pickup: Option<String>,
        #[arg(long)]
        dropoff: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Accept a requested delivery.
    Accept {
        /// Delivery ID.
        id: Uuid,
        /// Accepting driver.
        #[arg(long)]
        driver_id: Uuid,
    },
    /// Move a delivery to a new status.
    Status {
        /// Delivery ID.
        id: Uuid,
        #[arg(value_enum)]
        status: StatusArg,
    },
}
