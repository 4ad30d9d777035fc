//! lotlink-client CLI entry point.

use std::sync::Arc;

use clap::Parser;
use lotlink_client::cli::{Cli, Commands, OutputFormat};
use lotlink_client::output::{format_output, pretty};
use lotlink_client::{LotlinkClient, RemoteBackend};
use lotlink_core::marketplace::{
    CreateDealerRequest, CreateDeliveryRequest, CreateDriverRequest, CreateSalesUserRequest,
    ListDeliveriesQuery, SendMessageRequest, UpdateDeliveryRequest, UpdateDriverRequest,
};
use lotlink_core::realtime::ChangeFilter;
use lotlink_core::storage::MessageQuery;
use lotlink_core::unread::UnreadCounter;
use tokio_stream::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Print a value as JSON or with its pretty formatter.
fn print<T: serde::Serialize>(value: &T, format: OutputFormat, pretty: impl FnOnce(&T) -> String) {
    match format {
        OutputFormat::Json => println!("{}", format_output(value, format)),
        OutputFormat::Pretty => println!("{}", pretty(value)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lotlink_client=warn,lotlink_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = LotlinkClient::new(&cli.base_url);
    let format = cli.format;

    match cli.command {
        Commands::Dealers(dealers_cmd) => {
            use lotlink_client::cli::dealers::DealersAction;
            match dealers_cmd.action {
                DealersAction::List => {
                    let dealers = client.list_dealers().await?;
                    print(&dealers, format, |d| pretty::format_dealers(d));
                }
                DealersAction::Create { name, address } => {
                    let dealer = client
                        .create_dealer(CreateDealerRequest { name, address })
                        .await?;
                    print(&dealer, format, |d| {
                        format!("Created:\n{}", pretty::format_dealer(d))
                    });
                }
                DealersAction::Get { id } => {
                    let dealer = client.get_dealer(id).await?;
                    print(&dealer, format, pretty::format_dealer);
                }
            }
        }
        Commands::SalesUsers(users_cmd) => {
            use lotlink_client::cli::sales_users::SalesUsersAction;
            match users_cmd.action {
                SalesUsersAction::List { dealer_id } => {
                    let users = client.list_sales_users(dealer_id).await?;
                    print(&users, format, |u| pretty::format_sales_users(u));
                }
                SalesUsersAction::Create {
                    dealer_id,
                    name,
                    email,
                    phone,
                } => {
                    let user = client
                        .create_sales_user(CreateSalesUserRequest {
                            dealer_id,
                            name,
                            email,
                            phone,
                        })
                        .await?;
                    print(&user, format, |u| {
                        format!("Created:\n{}", pretty::format_sales_user(u))
                    });
                }
                SalesUsersAction::Get { id } => {
                    let user = client.get_sales_user(id).await?;
                    print(&user, format, pretty::format_sales_user);
                }
            }
        }
        Commands::Drivers(drivers_cmd) => {
            use lotlink_client::cli::drivers::DriversAction;
            match drivers_cmd.action {
                DriversAction::List { available } => {
                    let drivers = client.list_drivers(available).await?;
                    print(&drivers, format, |d| pretty::format_drivers(d));
                }
                DriversAction::Create { name, email, phone } => {
                    let driver = client
                        .create_driver(CreateDriverRequest { name, email, phone })
                        .await?;
                    print(&driver, format, |d| {
                        format!("Created:\n{}", pretty::format_driver(d))
                    });
                }
                DriversAction::Get { id } => {
                    let driver = client.get_driver(id).await?;
                    print(&driver, format, pretty::format_driver);
                }
                DriversAction::Update {
                    id,
                    phone,
                    available,
                } => {
                    let driver = client
                        .update_driver(id, UpdateDriverRequest { phone, available })
                        .await?;
                    print(&driver, format, |d| {
                        format!("Updated:\n{}", pretty::format_driver(d))
                    });
                }
            }
        }
        Commands::Deliveries(deliveries_cmd) => {
            use lotlink_client::cli::deliveries::DeliveriesAction;
            match deliveries_cmd.action {
                DeliveriesAction::List {
                    sales_user_id,
                    driver_id,
                    status,
                } => {
                    let deliveries = client
                        .list_deliveries(&ListDeliveriesQuery {
                            sales_user_id,
                            driver_id,
                            status: status.map(Into::into),
                        })
                        .await?;
                    print(&deliveries, format, |d| pretty::format_deliveries(d));
                }
                DeliveriesAction::Create {
                    sales_user_id,
                    kind,
                    vin,
                    pickup,
                    dropoff,
                    notes,
                } => {
                    let delivery = client
                        .create_delivery(CreateDeliveryRequest {
                            sales_user_id,
                            kind: kind.into(),
                            vin,
                            pickup_address: pickup,
                            dropoff_address: dropoff,
                            notes,
                        })
                        .await?;
                    print(&delivery, format, |d| {
                        format!("Requested:\n{}", pretty::format_delivery(d))
                    });
                }
                DeliveriesAction::Get { id } => {
                    let delivery = client.get_delivery(id).await?;
                    print(&delivery, format, pretty::format_delivery);
                }
                DeliveriesAction::Update {
                    id,
                    pickup,
                    dropoff,
                    notes,
                } => {
                    let delivery = client
                        .update_delivery(
                            id,
                            UpdateDeliveryRequest {
                                pickup_address: pickup,
                                dropoff_address: dropoff,
                                notes,
                            },
                        )
                        .await?;
                    print(&delivery, format, |d| {
                        format!("Updated:\n{}", pretty::format_delivery(d))
                    });
                }
                DeliveriesAction::Accept { id, driver_id } => {
                    let delivery = client.accept_delivery(id, driver_id).await?;
                    print(&delivery, format, |d| {
                        format!("Accepted:\n{}", pretty::format_delivery(d))
                    });
                }
                DeliveriesAction::Status { id, status } => {
                    let delivery = client.update_delivery_status(id, status.into()).await?;
                    print(&delivery, format, pretty::format_delivery);
                }
            }
        }
        Commands::Messages(messages_cmd) => {
            use lotlink_client::cli::messages::MessagesAction;
            match messages_cmd.action {
                MessagesAction::List { delivery_id } => {
                    let messages = client.list_messages(delivery_id).await?;
                    print(&messages, format, |m| pretty::format_messages(m));
                }
                MessagesAction::Send {
                    delivery_id,
                    sender_id,
                    recipient_id,
                    body,
                } => {
                    let message = client
                        .send_message(
                            delivery_id,
                            SendMessageRequest {
                                sender_id,
                                recipient_id,
                                body,
                            },
                        )
                        .await?;
                    print(&message, format, pretty::format_message);
                }
                MessagesAction::Read { id } => {
                    let message = client.mark_message_read(id).await?;
                    print(&message, format, pretty::format_message);
                }
                MessagesAction::ReadAll {
                    delivery_id,
                    recipient_id,
                } => {
                    let count = client
                        .mark_conversation_read(delivery_id, recipient_id)
                        .await?;
                    if !cli.quiet {
                        println!("Marked {} message(s) read", count);
                    }
                }
                MessagesAction::Unread {
                    delivery_id,
                    user_id,
                } => {
                    let count = client
                        .count_messages(&MessageQuery::unread_for(delivery_id, user_id))
                        .await?;
                    println!("{}", count);
                }
            }
        }
        Commands::Events(events_cmd) => {
            use lotlink_client::cli::events::EventsAction;
            match events_cmd.action {
                EventsAction::Watch {
                    conversation_id,
                    table,
                    last_event_id,
                } => {
                    let filter = ChangeFilter {
                        table: table.into(),
                        conversation_id,
                    };
                    if !cli.quiet {
                        eprintln!(
                            "Watching {} for delivery {}...",
                            filter.table.as_str(),
                            conversation_id
                        );
                    }
                    let stream = client.watch_events(filter, last_event_id).await?;
                    tokio::pin!(stream);
                    while let Some(event_result) = stream.next().await {
                        match event_result {
                            Ok(received) => match format {
                                OutputFormat::Json => {
                                    println!("{}", serde_json::to_string(&received)?)
                                }
                                OutputFormat::Pretty => {
                                    println!("{}", pretty::format_change(&received.event))
                                }
                            },
                            Err(e) => {
                                eprintln!("Error: {}", e);
                                break;
                            }
                        }
                    }
                }
            }
        }
        Commands::Unread(unread_cmd) => {
            use lotlink_client::cli::unread::UnreadAction;
            match unread_cmd.action {
                UnreadAction::Watch {
                    delivery_id,
                    user_id,
                    server: true,
                } => {
                    let stream = client.watch_unread(delivery_id, user_id).await?;
                    tokio::pin!(stream);
                    while let Some(snapshot) = stream.next().await {
                        match snapshot {
                            Ok(snapshot) => print(&snapshot, format, pretty::format_unread),
                            Err(e) => {
                                eprintln!("Error: {}", e);
                                break;
                            }
                        }
                    }
                }
                UnreadAction::Watch {
                    delivery_id,
                    user_id,
                    server: false,
                } => {
                    let backend = Arc::new(RemoteBackend::new(client.clone()));
                    let counter = UnreadCounter::new(backend.clone(), backend);
                    let mut updates = counter.subscribe();
                    counter.activate(delivery_id, user_id);

                    let snapshot = *updates.borrow_and_update();
                    print(&snapshot, format, pretty::format_unread);

                    loop {
                        tokio::select! {
                            changed = updates.changed() => {
                                if changed.is_err() {
                                    break;
                                }
                                let snapshot = *updates.borrow_and_update();
                                print(&snapshot, format, pretty::format_unread);
                            }
                            _ = tokio::signal::ctrl_c() => break,
                        }
                    }

                    counter.deactivate();
                }
            }
        }
        Commands::Health(health_cmd) => {
            use lotlink_client::cli::health::HealthAction;
            match health_cmd.action {
                HealthAction::Live => {
                    client.livez().await?;
                    if !cli.quiet {
                        println!("ok");
                    }
                }
                HealthAction::Check => {
                    let health = client.healthz().await?;
                    print(&health, format, |h| {
                        let mut output = format!(
                            "Health:\n  Healthy: {}\n  Event history: {}\n  Oldest event: {}\n  Active listeners: {}",
                            h.healthy, h.event_history_size, h.oldest_event_id, h.active_listeners
                        );
                        if let Some(error) = &h.error {
                            output.push_str(&format!("\n  Error: {}", error));
                        }
                        output
                    });
                }
            }
        }
    }

    Ok(())
}
