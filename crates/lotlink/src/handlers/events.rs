//! SSE events handler for real-time row changes.

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
};
use tokio::sync::broadcast;
use uuid::Uuid;

use lotlink_core::realtime::{ChangeFilter, Table};

use crate::{
    handlers::AppError,
    state::{AppState, StoredEvent},
};

/// Query parameters for the SSE events endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Table to watch (`messages` or `deliveries`).
    pub table: Table,
    /// Delivery the changes belong to.
    pub conversation_id: Uuid,
    /// Last event ID received (for reconnection catch-up).
    pub last_event_id: Option<u64>,
}

/// Reads the standard `Last-Event-ID` reconnection header.
fn last_event_id_header(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("last-event-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Converts a stored change into an SSE frame (`event:` is the change kind).
pub fn to_sse_event(stored: &StoredEvent) -> Event {
    let data = serde_json::to_string(&stored.event).unwrap_or_default();
    Event::default()
        .id(stored.id.to_string())
        .event(stored.event.kind.as_str())
        .data(data)
}

/// SSE endpoint for row changes (GET /api/events).
///
/// Streams insert/update events for one table + conversation. If a last event
/// ID is provided (query or `Last-Event-ID` header), missed events still in
/// the history are sent first. The history listener for the filter runs
/// while at least one connection for it is open.
pub async fn events_sse(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    let filter = ChangeFilter {
        table: query.table,
        conversation_id: query.conversation_id,
    };
    let last_event_id = query
        .last_event_id
        .or_else(|| last_event_id_header(&headers));

    // Subscribe to live history before the listener starts, so nothing
    // recorded in between is missed.
    let mut live = state.subscribe_history();
    let listener = state.ensure_event_listener(filter).await?;

    let mut shutdown_rx = state.subscribe_shutdown();

    tracing::debug!(
        table = filter.table.as_str(),
        conversation_id = %filter.conversation_id,
        last_event_id = ?last_event_id,
        "SSE events connection opened"
    );

    let stream = async_stream::stream! {
        // The listener for this filter stops once every connection is gone.
        let _listener = listener;
        let mut last_sent = last_event_id.unwrap_or(0);

        // First, send any missed events since last_event_id
        if let Some(since) = last_event_id {
            for stored in state.get_events_since(filter, since) {
                last_sent = stored.id;
                yield Ok(to_sse_event(&stored));
            }
        }

        loop {
            let stored = tokio::select! {
                result = live.recv() => match result {
                    Ok(stored) => stored,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            conversation_id = %filter.conversation_id,
                            lagged = n,
                            "SSE events stream lagged"
                        );
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = shutdown_rx.recv() => {
                    tracing::info!("SSE events stream received shutdown signal");
                    break;
                }
            };

            if stored.id <= last_sent || !filter.matches(&stored.event) {
                continue;
            }
            last_sent = stored.id;
            yield Ok(to_sse_event(&stored));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
